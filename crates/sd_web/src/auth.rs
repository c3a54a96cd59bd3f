use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sd_core::{Error, Result, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::AppState;

/// JWT session settings, read from the environment with development
/// fallbacks. Real deployments must set both secrets.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-access-secret".to_string());
        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-refresh-secret".to_string());
        Self {
            access_secret,
            refresh_secret,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(10),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    /// Unique per token, so two tokens minted in the same second still
    /// differ and rotation can tell them apart
    pub jti: String,
    pub exp: i64,
}

pub fn issue_token(user: &User, secret: &str, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        jti: uuid::Uuid::new_v4().to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Auth(format!("failed to sign token: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| Error::Auth(format!("invalid token: {e}")))
}

/// The authenticated user behind a `Authorization: Bearer <jwt>` header.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;

        let claims = verify_token(token, &state.auth.access_secret)?;
        let user = state
            .store
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("unknown user"))?;
        Ok(AuthUser(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub department: String,
    /// Already-hosted image URL; upload itself happens elsewhere
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| Error::Auth(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(|e| Error::Auth(format!("failed to verify password: {e}")))
}

async fn open_session(state: &AppState, user: &User) -> Result<SessionResponse> {
    let access_token = issue_token(user, &state.auth.access_secret, state.auth.access_ttl)?;
    let refresh_token = issue_token(user, &state.auth.refresh_secret, state.auth.refresh_ttl)?;
    state
        .store
        .set_refresh_token(&user.id, Some(&refresh_token))
        .await?;
    Ok(SessionResponse {
        user: user.clone(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    axum::Json(req): axum::Json<RegisterRequest>,
) -> ApiResult<ApiResponse<User>> {
    let required = [
        &req.username,
        &req.email,
        &req.full_name,
        &req.password,
        &req.department,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ApiError::bad_request("all fields are required"));
    }

    if state.store.find_by_identity(&req.username).await?.is_some()
        || state.store.find_by_identity(&req.email).await?.is_some()
    {
        return Err(ApiError::conflict("username or email already exists"));
    }

    let user = User::new(
        req.username.to_lowercase(),
        req.email,
        req.full_name,
        req.department.to_lowercase(),
        req.avatar,
        hash_password(&req.password)?,
        Utc::now(),
    );
    state.store.insert_user(&user).await?;

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        user,
        "User registered successfully",
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    axum::Json(req): axum::Json<LoginRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let identity = req
        .username
        .or(req.email)
        .ok_or_else(|| ApiError::bad_request("username or email is required"))?;

    let user = state
        .store
        .find_by_identity(&identity)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "user does not exist"))?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("invalid user credentials"));
    }

    let session = open_session(&state, &user).await?;
    Ok(ApiResponse::ok(session, "User logged in successfully"))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    axum::Json(req): axum::Json<RefreshRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let claims = verify_token(&req.refresh_token, &state.auth.refresh_secret)?;
    let user = state
        .store
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("unknown user"))?;

    // The token must also be the one currently on record: a rotated-out
    // token stays signed but is no longer accepted.
    if user.refresh_token.as_deref() != Some(req.refresh_token.as_str()) {
        return Err(ApiError::unauthorized("refresh token is expired or used"));
    }

    let session = open_session(&state, &user).await?;
    Ok(ApiResponse::ok(session, "Access token refreshed"))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.store.set_refresh_token(&user.id, None).await?;
    Ok(ApiResponse::ok(
        serde_json::Value::Null,
        "User logged out successfully",
    ))
}

pub async fn current_user(AuthUser(user): AuthUser) -> ApiResult<ApiResponse<User>> {
    Ok(ApiResponse::ok(user, "Current user fetched successfully"))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    axum::Json(req): axum::Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    if !verify_password(&req.old_password, &user.password_hash)? {
        return Err(ApiError::unauthorized("old password is incorrect"));
    }
    let hash = hash_password(&req.new_password)?;
    state.store.set_password_hash(&user.id, &hash).await?;
    Ok(ApiResponse::ok(
        serde_json::Value::Null,
        "Password changed successfully",
    ))
}

pub async fn update_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    axum::Json(req): axum::Json<UpdateAccountRequest>,
) -> ApiResult<ApiResponse<User>> {
    if req.full_name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::bad_request("all fields are required"));
    }
    let updated = state
        .store
        .update_account(&user.id, &req.full_name, &req.email)
        .await?;
    Ok(ApiResponse::ok(updated, "Account details updated"))
}
