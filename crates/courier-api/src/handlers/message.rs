//! Message CRUD handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use courier_core::error::AppError;
use courier_core::types::pagination::PageResponse;
use courier_service::message::{MessageUpdate, NewMessage};

use crate::dto::request::{CreateMessageRequest, UpdateMessageRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// POST /api/messages
pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let message = state
        .message_service
        .create(NewMessage {
            phone_number: req.phone_number,
            content: req.content,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(MessageResponse::from(message))),
    ))
}

/// GET /api/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<MessageResponse>>>, ApiError> {
    let page = state
        .message_service
        .list(params.into_page_request())
        .await?;

    let response = PageResponse::new(
        page.items.into_iter().map(MessageResponse::from).collect(),
        page.page,
        page.page_size,
        page.total_items,
    );
    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/messages/{id}
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let message = state.message_service.get(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::from(message))))
}

/// PUT /api/messages/{id}
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let message = state
        .message_service
        .update(
            id,
            MessageUpdate {
                phone_number: req.phone_number,
                content: req.content,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::from(message))))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.message_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
