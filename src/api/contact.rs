//! Contact API endpoints
//!
//! - POST /api/v1/contact - submit a message (public)
//! - GET /api/v1/contact/messages - list messages (staff)
//! - PUT /api/v1/contact/messages/{id}/read - toggle the read flag (staff)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ContactMessageResponse;
use crate::models::ContactSubmission;

/// Acknowledgement returned to the submitter; deliberately minimal
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: i64,
}

/// Request body for toggling the read flag
#[derive(Debug, Deserialize)]
pub struct SetReadRequest {
    pub read: bool,
}

/// Paginated contact message list (staff)
#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub messages: Vec<ContactMessageResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// POST /api/v1/contact
pub async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<ContactSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let message = state.contact_service.submit(submission).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id: message.id })))
}

/// GET /api/v1/contact/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let params = pagination.to_params();
    let (messages, total) = state
        .contact_service
        .list(params.offset(), params.limit())
        .await?;

    Ok(Json(ContactListResponse {
        messages: messages
            .into_iter()
            .map(ContactMessageResponse::from)
            .collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// PUT /api/v1/contact/messages/{id}/read
pub async fn set_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetReadRequest>,
) -> Result<Json<ContactMessageResponse>, ApiError> {
    let message = state.contact_service.set_read(id, request.read).await?;
    Ok(Json(message.into()))
}
