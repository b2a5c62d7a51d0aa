//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - create an account
//! - POST /api/v1/auth/login - authenticate and receive a session token
//! - POST /api/v1/auth/logout - destroy the current session (authenticated)
//! - GET /api/v1/auth/me - current user (authenticated)

use axum::{
    extract::{Extension, Request, State},
    http::{header, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::UserResponse;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response carrying the session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (user, session) = state
        .user_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.id,
        expires_at: session.expires_at.to_rfc3339(),
        user: user.into(),
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    // The auth middleware already validated the token; re-extract it here to
    // know which session to destroy.
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| {
            request
                .headers()
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|cookies| {
                    cookies
                        .split(';')
                        .find_map(|c| c.trim().strip_prefix("session=").map(str::to_string))
                })
        })
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(user.into())
}
