//! API middleware
//!
//! Shared application state, the API error envelope, and the
//! authentication/authorization middlewares. Session tokens are accepted
//! from a `Bearer` authorization header or a `session=` cookie.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::models::User;
use crate::services::{
    CategoryService, CategoryServiceError, ContactService, ContactServiceError, PostService,
    PostServiceError, TagService, TagServiceError, UserService, UserServiceError,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub post_service: Arc<PostService>,
    pub category_service: Arc<CategoryService>,
    pub tag_service: Arc<TagService>,
    pub contact_service: Arc<ContactService>,
    pub user_service: Arc<UserService>,
}

/// Authenticated user extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Error response envelope for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<PostServiceError> for ApiError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(_) => ApiError::not_found("Post not found"),
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::PermissionDenied(msg) => ApiError::forbidden(msg),
            PostServiceError::InternalError(e) => {
                tracing::error!("Post service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::NotFound(_) => ApiError::not_found("Category not found"),
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::DuplicateName(name) => {
                ApiError::conflict(format!("Category name already exists: {}", name))
            }
            CategoryServiceError::InternalError(e) => {
                tracing::error!("Category service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<TagServiceError> for ApiError {
    fn from(err: TagServiceError) -> Self {
        match err {
            TagServiceError::NotFound(_) => ApiError::not_found("Tag not found"),
            TagServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            TagServiceError::InternalError(e) => {
                tracing::error!("Tag service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<ContactServiceError> for ApiError {
    fn from(err: ContactServiceError) -> Self {
        match err {
            ContactServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            // Spam rejections stay indistinguishable from ordinary bad input
            ContactServiceError::Rejected => {
                ApiError::validation_error("Unable to process submission")
            }
            ContactServiceError::NotFound(_) => ApiError::not_found("Contact message not found"),
            ContactServiceError::InternalError(e) => {
                tracing::error!("Contact service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidCredentials => {
                ApiError::unauthorized("Invalid username or password")
            }
            UserServiceError::UsernameTaken(name) => {
                ApiError::conflict(format!("Username already taken: {}", name))
            }
            UserServiceError::EmailTaken(_) => {
                ApiError::conflict("Email already registered".to_string())
            }
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::InternalError(e) => {
                tracing::error!("User service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// Extract a session token from the Authorization header or session cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware; rejects requests without a valid session
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .authenticate(&token)
        .await
        .map_err(|e| {
            tracing::error!("Session validation failed: {}", e);
            ApiError::internal_error("Internal server error")
        })?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication; attaches the user when a valid session is
/// present, continues anonymously otherwise
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(&request) {
        if let Ok(Some(user)) = state.user_service.authenticate(&token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}

/// Staff authorization middleware; must run inside `require_auth`
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_staff {
        return Err(ApiError::forbidden("Staff privileges required"));
    }

    Ok(next.run(request).await)
}
