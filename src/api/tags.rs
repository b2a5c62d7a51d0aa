//! Tag API endpoints
//!
//! - GET /api/v1/tags - all tags
//! - GET /api/v1/tags/{slug} - tag detail

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::TagInfo;
use crate::models::Tag;

fn to_info(tag: Tag) -> TagInfo {
    TagInfo {
        id: tag.id,
        slug: tag.slug,
        name: tag.name,
    }
}

/// GET /api/v1/tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagInfo>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags.into_iter().map(to_info).collect()))
}

/// GET /api/v1/tags/{slug}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TagInfo>, ApiError> {
    let tag = state.tag_service.get_by_slug(&slug).await?;
    Ok(Json(to_info(tag)))
}
