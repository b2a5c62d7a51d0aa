//! Post API endpoints
//!
//! - GET /api/v1/posts - list visible posts with filters and pagination
//! - GET /api/v1/posts/popular - most viewed published posts
//! - GET /api/v1/posts/drafts - draft listing (authenticated)
//! - GET /api/v1/posts/{slug} - post detail; counts a view when published
//! - POST /api/v1/posts - create (authenticated)
//! - PUT /api/v1/posts/{id} - update (author or staff)
//! - DELETE /api/v1/posts/{id} - delete (author or staff)

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PostListResponse, PostResponse};
use crate::models::{CreatePostInput, ListParams, PostFilter, PostStatus, UpdatePostInput};

/// Query parameters for listing posts
///
/// Pagination fields are inlined rather than flattened; the urlencoded
/// deserializer cannot route numeric fields through `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "crate::api::common::default_page")]
    pub page: u32,
    #[serde(default = "crate::api::common::default_per_page")]
    pub per_page: u32,
    /// Case-insensitive substring match against title or content
    pub search: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Tag slug
    pub tag: Option<String>,
    /// Status (draft, published, archived)
    pub status: Option<String>,
    /// Author username
    pub author: Option<String>,
}

impl ListPostsQuery {
    fn to_filter(&self) -> Result<PostFilter, ApiError> {
        let status = match self.status.as_deref() {
            Some(s) => Some(
                PostStatus::from_str(s)
                    .ok_or_else(|| ApiError::validation_error(format!("Unknown status: {}", s)))?,
            ),
            None => None,
        };

        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(PostFilter {
            search: non_empty(&self.search),
            category: non_empty(&self.category),
            tag: non_empty(&self.tag),
            status,
            author: non_empty(&self.author),
        })
    }
}

/// Request body for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating a post
///
/// `category_id` distinguishes absent (unchanged) from null (cleared) via
/// double Option.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub category_id: Option<Option<i64>>,
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Absent field stays None via `default`; an explicit null arrives here and
/// becomes Some(None), clearing the category.
fn deserialize_double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Ok(Some(Option::<i64>::deserialize(deserializer)?))
}

/// Post detail response with related posts attached
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub related: Vec<PostResponse>,
}

fn parse_status(status: Option<&str>) -> Result<Option<PostStatus>, ApiError> {
    match status {
        Some(s) => PostStatus::from_str(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation_error(format!("Unknown status: {}", s))),
        None => Ok(None),
    }
}

/// GET /api/v1/posts
pub async fn list_posts(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let filter = query.to_filter()?;
    let params = ListParams::new(query.page, query.per_page);
    let viewer = viewer.as_ref().map(|ext| &ext.0 .0);

    let result = state.post_service.list(viewer, &filter, &params).await?;
    Ok(Json(result.into()))
}

/// Query parameters for the popular listing
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/posts/popular
pub async fn popular_posts(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state.post_service.popular(query.limit).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/v1/posts/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(viewer)): Extension<AuthenticatedUser>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = pagination.to_params();
    let result = state.post_service.list_drafts(&viewer, &params).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/posts/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let viewer = viewer.as_ref().map(|ext| &ext.0 .0);
    // Qualifying detail read: exactly one increment, published only; the
    // returned post already carries the fresh count
    let post = state.post_service.view(viewer, &slug).await?;

    let tags = state.post_service.tags_for(post.id).await?;
    let related = state.post_service.related(&post).await?;

    Ok(Json(PostDetailResponse {
        post: PostResponse::from(post).with_tags(tags),
        related: related.into_iter().map(PostResponse::from).collect(),
    }))
}

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(author)): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let status = parse_status(request.status.as_deref())?;
    let tag_ids = state.tag_service.resolve_names(&request.tags).await?;

    let input = CreatePostInput {
        title: request.title,
        content: request.content,
        author_id: author.id,
        category_id: request.category_id,
        status,
    };

    let post = state.post_service.create(&author, input, tag_ids).await?;
    let tags = state.post_service.tags_for(post.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::from(post).with_tags(tags)),
    ))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(viewer)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let status = parse_status(request.status.as_deref())?;

    let tag_ids = match request.tags {
        Some(ref names) => Some(state.tag_service.resolve_names(names).await?),
        None => None,
    };

    let input = UpdatePostInput {
        title: request.title,
        content: request.content,
        category_id: request.category_id,
        status,
    };

    let post = state
        .post_service
        .update(&viewer, id, input, tag_ids)
        .await?;
    let tags = state.post_service.tags_for(post.id).await?;

    Ok(Json(PostResponse::from(post).with_tags(tags)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(viewer)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(&viewer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
