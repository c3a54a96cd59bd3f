use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod handlers;
pub mod response;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/v1/users/register", post(auth::register))
        .route("/api/v1/users/login", post(auth::login))
        .route("/api/v1/users/logout", post(auth::logout))
        .route("/api/v1/users/refreshToken", post(auth::refresh_token))
        .route("/api/v1/users/changePassword", patch(auth::change_password))
        .route("/api/v1/users/getCurrentUser", get(auth::current_user))
        .route(
            "/api/v1/users/updateAccountDetails",
            patch(auth::update_account),
        )
        .route("/api/v1/news/allNews", get(handlers::get_all_news))
        .route("/api/v1/news/insertDailyAvg", post(handlers::insert_daily_avg))
        .route(
            "/api/v1/news/getAreaChartData",
            get(handlers::get_area_chart_data),
        )
        .route(
            "/api/v1/news/getPieChartData",
            get(handlers::get_pie_chart_data),
        )
        .route("/api/v1/email/postAllEmails", get(handlers::post_all_emails))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use sd_core::{Error, Result};
}
