use axum::extract::State;
use chrono::Utc;
use sd_core::{ChartSeries, DailySnapshot, DepartmentCount, Error, NewsArticle};
use std::sync::Arc;
use tracing::warn;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

pub async fn get_all_news(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<ApiResponse<Vec<NewsArticle>>> {
    let news = state.store.all_articles().await?;
    Ok(ApiResponse::ok(news, "News fetched successfully"))
}

/// Aggregation trigger hit by the external scheduler once a day.
pub async fn insert_daily_avg(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse<DailySnapshot>> {
    let snapshot =
        sd_analytics::persist_daily_snapshot(&*state.store, &*state.store, Utc::now()).await?;
    Ok(ApiResponse::ok(
        snapshot,
        "Daily average sentiment calculated successfully",
    ))
}

pub async fn get_area_chart_data(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<ApiResponse<Vec<ChartSeries>>> {
    let series = sd_analytics::weekly_series(&*state.store, Utc::now()).await?;
    Ok(ApiResponse::ok(
        series.into(),
        "Area chart data fetched successfully",
    ))
}

pub async fn get_pie_chart_data(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> ApiResult<ApiResponse<Vec<DepartmentCount>>> {
    let counts = sd_analytics::department_distribution(&*state.store).await?;
    Ok(ApiResponse::ok(
        counts,
        "Department news count retrieved successfully",
    ))
}

/// Digest trigger hit by the external scheduler. An empty article set is
/// not worth a failure response here: log it and send nothing.
pub async fn post_all_emails(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let summary = match sd_analytics::digest_summary(&*state.store).await {
        Ok(summary) => summary,
        Err(Error::Computation(reason)) => {
            warn!(%reason, "skipping digest run");
            return Ok(ApiResponse::ok(
                serde_json::Value::Null,
                "No news to summarize, digest skipped",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let users = state.store.all_users().await?;
    let recipients = users.len();
    for user in &users {
        state.notifier.send_digest(user, &summary).await?;
    }
    Ok(ApiResponse::ok(
        serde_json::json!({ "recipients": recipients }),
        "Emails sent successfully",
    ))
}
