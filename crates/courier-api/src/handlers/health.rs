//! Health check handlers.

use axum::Json;
use axum::extract::State;

use courier_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };

    let cache = match &state.cache {
        Some(cache) => match cache.health_check().await {
            Ok(true) => "connected",
            _ => "unavailable",
        },
        None => "disabled",
    };

    let status = if database == "connected" { "ok" } else { "degraded" };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        cache: cache.to_string(),
        sender_running: state.sender_job.is_running().await,
    }))
}
