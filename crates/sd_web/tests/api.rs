use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use sd_core::{LogNotifier, NewsArticle, NewsStore, Tonality};
use sd_storage::MemoryStorage;
use sd_web::auth::AuthConfig;
use sd_web::{create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn test_auth() -> AuthConfig {
    AuthConfig {
        access_secret: "test-access".to_string(),
        refresh_secret: "test-refresh".to_string(),
        access_ttl: Duration::minutes(5),
        refresh_ttl: Duration::days(1),
    }
}

async fn app_with_storage() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new().await.unwrap());
    let state = AppState {
        store: storage.clone(),
        notifier: Arc::new(LogNotifier),
        auth: test_auth(),
    };
    (create_app(state).await, storage)
}

fn article(tonality: Tonality) -> NewsArticle {
    NewsArticle {
        title: "Rates unchanged".to_string(),
        content: "The central bank left rates unchanged.".to_string(),
        link: "http://example.com/rates".to_string(),
        img: "http://example.com/rates.jpg".to_string(),
        language: "en".to_string(),
        department: "economy".to_string(),
        source: "example".to_string(),
        publication_date: Utc.with_ymd_and_hms(2026, 8, 20, 6, 0, 0).unwrap(),
        tonality,
        score: 0.2,
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn register_and_login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/register",
            serde_json::json!({
                "username": "dana",
                "email": "dana@example.com",
                "full_name": "Dana Okafor",
                "password": "hunter2",
                "department": "economy",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/login",
            serde_json::json!({ "username": "dana", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn news_routes_require_a_bearer_token() {
    let (app, _storage) = app_with_storage().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/news/allNews")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_grants_access_to_news() {
    let (app, storage) = app_with_storage().await;
    storage.insert_article(&article(Tonality::Positive)).await.unwrap();
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/news/allNews")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn aggregation_trigger_fails_fast_on_an_empty_store() {
    let (app, _storage) = app_with_storage().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/news/insertDailyAvg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn aggregation_trigger_persists_and_reports_the_distribution() {
    let (app, storage) = app_with_storage().await;
    for tonality in [Tonality::Positive, Tonality::Positive, Tonality::Neutral] {
        storage.insert_article(&article(tonality)).await.unwrap();
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/news/insertDailyAvg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body["data"]["tonality"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "positive");
}

#[tokio::test]
async fn pie_chart_groups_by_department() {
    let (app, storage) = app_with_storage().await;
    storage.insert_article(&article(Tonality::Positive)).await.unwrap();
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/news/getPieChartData")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["name"], "economy");
    assert_eq!(body["data"][0]["count"], 1);
}

#[tokio::test]
async fn digest_trigger_skips_when_there_is_no_news() {
    let (app, _storage) = app_with_storage().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/email/postAllEmails")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("skipped"));
}

#[tokio::test]
async fn refresh_rotates_the_stored_token() {
    let (app, _storage) = app_with_storage().await;
    let _token = register_and_login(&app).await;

    // Log in again to get the refresh token from the envelope
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/login",
            serde_json::json!({ "email": "dana@example.com", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/refreshToken",
            serde_json::json!({ "refresh_token": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The first refresh token was rotated out and is no longer accepted
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/refreshToken",
            serde_json::json!({ "refresh_token": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
