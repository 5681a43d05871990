//! Sender control handlers.
//!
//! Maps the operational control surface 1:1 onto the sender job's
//! `start`/`stop`/`is_running`.

use axum::Json;
use axum::extract::State;

use courier_core::error::AppError;

use crate::dto::response::{ApiResponse, SenderStatusResponse, StatusMessageResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/sender/start
pub async fn start_sender(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusMessageResponse>>, ApiError> {
    state
        .sender_job
        .start()
        .await
        .map_err(AppError::from)?;

    Ok(Json(ApiResponse::ok(StatusMessageResponse {
        message: "Message sender started".to_string(),
    })))
}

/// POST /api/sender/stop
pub async fn stop_sender(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusMessageResponse>>, ApiError> {
    state.sender_job.stop().await.map_err(AppError::from)?;

    Ok(Json(ApiResponse::ok(StatusMessageResponse {
        message: "Message sender stopped".to_string(),
    })))
}

/// GET /api/sender/status
pub async fn sender_status(
    State(state): State<AppState>,
) -> Json<ApiResponse<SenderStatusResponse>> {
    Json(ApiResponse::ok(SenderStatusResponse {
        running: state.sender_job.is_running().await,
    }))
}
