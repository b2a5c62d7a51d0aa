//! Category API endpoints
//!
//! - GET /api/v1/categories - all categories
//! - GET /api/v1/categories/nav - cached navigation list (first 8)
//! - GET /api/v1/categories/{slug} - category detail
//! - POST /api/v1/categories - create (staff)
//! - PUT /api/v1/categories/{id} - rename (staff)
//! - DELETE /api/v1/categories/{id} - delete (staff)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::CategoryResponse;
use crate::models::{CreateCategoryInput, UpdateCategoryInput};

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Request body for renaming a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.category_service.list().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/v1/categories/nav
pub async fn nav_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.category_service.nav_categories().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/v1/categories/{slug}
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state.category_service.get_by_slug(&slug).await?;
    Ok(Json(category.into()))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state
        .category_service
        .create(CreateCategoryInput { name: request.name })
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .update(id, UpdateCategoryInput { name: request.name })
        .await?;
    Ok(Json(category.into()))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
