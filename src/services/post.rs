//! Post service
//!
//! Business logic for posts:
//! - validation (title and content bounds) and content sanitization
//! - unique slug assignment, regenerated only when the title changes
//! - visibility enforcement via the policy module
//! - navigation cache invalidation on category-affecting mutations
//! - view-count accounting as an atomic partial write
//!
//! Hidden posts surface as `NotFound` on reads so their existence is not
//! leaked; denied writes surface as `PermissionDenied`.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{
    CreatePostInput, ListParams, PagedResult, Post, PostFilter, PostStatus, Tag, UpdatePostInput,
    User, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH, MIN_CONTENT_LENGTH, MIN_TITLE_LENGTH,
};
use crate::services::category::NAV_CACHE_KEY;
use crate::services::{policy, sanitize, slug};
use anyhow::Context;
use std::sync::Arc;

/// Number of related posts returned for a detail view
pub const RELATED_POST_LIMIT: i64 = 3;

/// Number of posts in the popular listing
pub const POPULAR_POST_LIMIT: i64 = 5;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found, or hidden from the requester
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Requester is neither author nor staff
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
    cache: Arc<MemoryCache>,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        repo: Arc<dyn PostRepository>,
        tag_repo: Arc<dyn TagRepository>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            repo,
            tag_repo,
            cache,
        }
    }

    fn validate_title(title: &str) -> Result<(), PostServiceError> {
        let len = title.chars().count();
        if len < MIN_TITLE_LENGTH || len > MAX_TITLE_LENGTH {
            return Err(PostServiceError::ValidationError(format!(
                "Title must be between {} and {} characters",
                MIN_TITLE_LENGTH, MAX_TITLE_LENGTH
            )));
        }
        Ok(())
    }

    fn validate_content(content: &str) -> Result<(), PostServiceError> {
        let len = content.chars().count();
        if len < MIN_CONTENT_LENGTH || len > MAX_CONTENT_LENGTH {
            return Err(PostServiceError::ValidationError(format!(
                "Content must be between {} and {} characters",
                MIN_CONTENT_LENGTH, MAX_CONTENT_LENGTH
            )));
        }
        Ok(())
    }

    async fn generate_slug(&self, title: &str) -> Result<String, PostServiceError> {
        let slug = slug::generate_unique_slug(title, |probe| {
            let repo = self.repo.clone();
            async move { repo.exists_by_slug(&probe).await }
        })
        .await
        .context("Failed to generate post slug")?;
        Ok(slug)
    }

    /// Drop the navigation cache entry. Best-effort.
    async fn invalidate_nav_cache(&self) {
        if let Err(e) = self.cache.delete(NAV_CACHE_KEY).await {
            tracing::warn!("Failed to invalidate navigation cache: {}", e);
        }
    }

    /// Create a new post authored by `author`.
    ///
    /// Content is sanitized before validation so the persisted length is the
    /// one checked. Tag names are attached as given; the caller resolves
    /// them to IDs beforehand.
    pub async fn create(
        &self,
        author: &User,
        mut input: CreatePostInput,
        tag_ids: Vec<i64>,
    ) -> Result<Post, PostServiceError> {
        input.author_id = author.id;
        input.content = sanitize::clean(&input.content);

        Self::validate_title(&input.title)?;
        Self::validate_content(&input.content)?;

        let slug = self.generate_slug(&input.title).await?;
        let post = self
            .repo
            .create(&input, &slug)
            .await
            .context("Failed to create post")?;

        if !tag_ids.is_empty() {
            self.tag_repo
                .replace_for_post(post.id, &tag_ids)
                .await
                .context("Failed to attach tags")?;
        }

        // New posts can change which categories the nav list reflects
        self.invalidate_nav_cache().await;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Get a post by slug, enforcing visibility.
    ///
    /// Hidden posts report `NotFound`, identical to missing ones.
    pub async fn get_by_slug(
        &self,
        viewer: Option<&User>,
        slug: &str,
    ) -> Result<Post, PostServiceError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        if !policy::can_view(viewer, &post) {
            return Err(PostServiceError::NotFound(slug.to_string()));
        }

        Ok(post)
    }

    /// Record a qualifying detail read of a published post.
    ///
    /// Increments the view counter by exactly one through a partial write;
    /// no other field is touched. Draft and archived reads never count.
    /// Returns whether the read was counted.
    pub async fn record_view(&self, post: &Post) -> Result<bool, PostServiceError> {
        if post.status != PostStatus::Published {
            return Ok(false);
        }
        self.repo
            .increment_views(post.id)
            .await
            .context("Failed to record view")?;
        Ok(true)
    }

    /// Detail read: fetch by slug within scope and count the view.
    ///
    /// The returned post reflects the counter including this read, so
    /// callers never serve a stale count.
    pub async fn view(&self, viewer: Option<&User>, slug: &str) -> Result<Post, PostServiceError> {
        let mut post = self.get_by_slug(viewer, slug).await?;
        if self.record_view(&post).await? {
            post.views += 1;
        }
        Ok(post)
    }

    /// List posts visible to the requester, filtered and paginated.
    ///
    /// Default order is creation time descending. Multi-tag posts appear
    /// once regardless of tag filters.
    pub async fn list(
        &self,
        viewer: Option<&User>,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let scope = policy::read_scope(viewer);

        let items = self
            .repo
            .list(scope, filter, params.offset(), params.limit())
            .await
            .context("Failed to list posts")?;
        let total = self
            .repo
            .count(scope, filter)
            .await
            .context("Failed to count posts")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// List drafts: all of them for staff, own drafts for everyone else.
    pub async fn list_drafts(
        &self,
        viewer: &User,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let author_filter = policy::draft_author_filter(viewer);

        let items = self
            .repo
            .list_drafts(author_filter, params.offset(), params.limit())
            .await
            .context("Failed to list drafts")?;
        let total = self
            .repo
            .count_drafts(author_filter)
            .await
            .context("Failed to count drafts")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Update a post.
    ///
    /// The slug is regenerated only when the title actually changes; other
    /// edits keep existing URLs stable. The navigation cache is invalidated
    /// only when the category reference changes.
    pub async fn update(
        &self,
        viewer: &User,
        id: i64,
        mut input: UpdatePostInput,
        tag_ids: Option<Vec<i64>>,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(id.to_string()))?;

        if !policy::can_modify(viewer, &existing) {
            return Err(PostServiceError::PermissionDenied(
                "Only the author or staff may modify this post".to_string(),
            ));
        }

        if let Some(ref mut content) = input.content {
            *content = sanitize::clean(content);
            Self::validate_content(content)?;
        }

        let mut new_slug = None;
        if let Some(ref title) = input.title {
            Self::validate_title(title)?;
            if *title != existing.title {
                // The post's own slug is not a collision; a retitle that
                // normalizes to the held slug keeps it without a suffix
                let slug = slug::generate_unique_slug(title, |probe| {
                    let repo = self.repo.clone();
                    async move { repo.exists_by_slug_excluding(&probe, id).await }
                })
                .await
                .context("Failed to generate post slug")?;
                new_slug = Some(slug);
            }
        }

        let category_changed = match input.category_id {
            Some(new_category) => new_category != existing.category_id,
            None => false,
        };

        let post = self
            .repo
            .update(id, &input, new_slug.as_deref())
            .await
            .context("Failed to update post")?;

        if let Some(ids) = tag_ids {
            self.tag_repo
                .replace_for_post(id, &ids)
                .await
                .context("Failed to update tags")?;
        }

        // Unrelated edits must not churn the nav cache
        if category_changed {
            self.invalidate_nav_cache().await;
        }

        Ok(post)
    }

    /// Delete a post. Author or staff only.
    pub async fn delete(&self, viewer: &User, id: i64) -> Result<(), PostServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(id.to_string()))?;

        if !policy::can_modify(viewer, &existing) {
            return Err(PostServiceError::PermissionDenied(
                "Only the author or staff may delete this post".to_string(),
            ));
        }

        self.repo.delete(id).await.context("Failed to delete post")?;
        self.invalidate_nav_cache().await;

        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    /// Published posts ordered by view count descending
    pub async fn popular(&self, limit: Option<i64>) -> Result<Vec<Post>, PostServiceError> {
        let limit = limit.unwrap_or(POPULAR_POST_LIMIT).clamp(1, 20);
        Ok(self
            .repo
            .list_popular(limit)
            .await
            .context("Failed to list popular posts")?)
    }

    /// Published posts from the same category, excluding the post itself.
    /// Posts without a category have no related posts.
    pub async fn related(&self, post: &Post) -> Result<Vec<Post>, PostServiceError> {
        let Some(category_id) = post.category_id else {
            return Ok(Vec::new());
        };
        Ok(self
            .repo
            .list_related(category_id, post.id, RELATED_POST_LIMIT)
            .await
            .context("Failed to list related posts")?)
    }

    /// Tags attached to a post
    pub async fn tags_for(&self, post_id: i64) -> Result<Vec<Tag>, PostServiceError> {
        Ok(self
            .tag_repo
            .list_for_post(post_id)
            .await
            .context("Failed to list post tags")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::{
        CategoryRepository, SqlxCategoryRepository, SqlxPostRepository, SqlxTagRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateUserInput;
    use std::time::Duration;

    struct Fixture {
        service: PostService,
        cache: Arc<MemoryCache>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let cache = create_cache(&CacheConfig::default());
        let service = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            cache.clone(),
        );
        Fixture {
            service,
            cache,
            categories: SqlxCategoryRepository::boxed(pool.clone()),
            users: SqlxUserRepository::boxed(pool),
        }
    }

    async fn make_user(fixture: &Fixture, username: &str, is_staff: bool) -> User {
        fixture
            .users
            .create(&CreateUserInput {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hash".to_string(),
                is_staff,
            })
            .await
            .unwrap()
    }

    fn make_input(title: &str, status: PostStatus) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: "x".repeat(80),
            author_id: 0,
            category_id: None,
            status: Some(status),
        }
    }

    async fn warm_nav_cache(fixture: &Fixture) {
        fixture
            .cache
            .set(NAV_CACHE_KEY, &vec!["warm"], Duration::from_secs(60))
            .await
            .unwrap();
    }

    async fn nav_cache_is_warm(fixture: &Fixture) -> bool {
        fixture
            .cache
            .get::<Vec<String>>(NAV_CACHE_KEY)
            .await
            .unwrap()
            .is_some()
    }

    #[tokio::test]
    async fn test_create_assigns_unique_slugs() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let first = fixture
            .service
            .create(&author, make_input("Hello World", PostStatus::Published), vec![])
            .await
            .unwrap();
        let second = fixture
            .service
            .create(&author, make_input("Hello World", PostStatus::Published), vec![])
            .await
            .unwrap();

        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-1");
    }

    #[tokio::test]
    async fn test_create_sanitizes_content() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let mut input = make_input("Scripted Post", PostStatus::Published);
        input.content = format!("<script>alert(1)</script>{}", "y".repeat(80));
        let post = fixture.service.create(&author, input, vec![]).await.unwrap();
        assert!(!post.content.contains("<script>"));
    }

    #[tokio::test]
    async fn test_create_rejects_short_content() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let mut input = make_input("Valid Title", PostStatus::Draft);
        input.content = "too short".to_string();
        let result = fixture.service.create(&author, input, vec![]).await;
        assert!(matches!(result, Err(PostServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_short_title() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let result = fixture
            .service
            .create(&author, make_input("Hi", PostStatus::Draft), vec![])
            .await;
        assert!(matches!(result, Err(PostServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_hidden_post_reads_as_not_found() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;
        let other = make_user(&fixture, "bob", false).await;
        let staff = make_user(&fixture, "mod", true).await;

        let draft = fixture
            .service
            .create(&author, make_input("Secret Draft", PostStatus::Draft), vec![])
            .await
            .unwrap();

        assert!(matches!(
            fixture.service.get_by_slug(None, &draft.slug).await,
            Err(PostServiceError::NotFound(_))
        ));
        assert!(matches!(
            fixture.service.get_by_slug(Some(&other), &draft.slug).await,
            Err(PostServiceError::NotFound(_))
        ));
        assert!(fixture
            .service
            .get_by_slug(Some(&author), &draft.slug)
            .await
            .is_ok());
        assert!(fixture
            .service
            .get_by_slug(Some(&staff), &draft.slug)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_draft_listing_matrix() {
        let fixture = setup().await;
        let alice = make_user(&fixture, "alice", false).await;
        let bob = make_user(&fixture, "bob", false).await;
        let staff = make_user(&fixture, "mod", true).await;

        fixture
            .service
            .create(&alice, make_input("Alice Draft", PostStatus::Draft), vec![])
            .await
            .unwrap();
        fixture
            .service
            .create(&bob, make_input("Bob Draft", PostStatus::Draft), vec![])
            .await
            .unwrap();

        let params = ListParams::default();
        let own = fixture.service.list_drafts(&alice, &params).await.unwrap();
        assert_eq!(own.total, 1);
        assert_eq!(own.items[0].title, "Alice Draft");

        let all = fixture.service.list_drafts(&staff, &params).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_record_view_counts_published_only() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let published = fixture
            .service
            .create(&author, make_input("Counted Post", PostStatus::Published), vec![])
            .await
            .unwrap();
        let draft = fixture
            .service
            .create(&author, make_input("Uncounted Draft", PostStatus::Draft), vec![])
            .await
            .unwrap();

        for _ in 0..3 {
            fixture.service.record_view(&published).await.unwrap();
        }
        fixture.service.record_view(&draft).await.unwrap();

        let found = fixture
            .service
            .get_by_slug(Some(&author), &published.slug)
            .await
            .unwrap();
        assert_eq!(found.views, 3);

        let found = fixture
            .service
            .get_by_slug(Some(&author), &draft.slug)
            .await
            .unwrap();
        assert_eq!(found.views, 0);
    }

    #[tokio::test]
    async fn test_view_returns_fresh_count() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let published = fixture
            .service
            .create(&author, make_input("Fresh Count", PostStatus::Published), vec![])
            .await
            .unwrap();
        let draft = fixture
            .service
            .create(&author, make_input("Uncounted View", PostStatus::Draft), vec![])
            .await
            .unwrap();

        // Each detail read reports the counter including itself
        let first = fixture.service.view(None, &published.slug).await.unwrap();
        assert_eq!(first.views, 1);
        let second = fixture.service.view(None, &published.slug).await.unwrap();
        assert_eq!(second.views, 2);

        let stored = fixture
            .service
            .get_by_slug(None, &published.slug)
            .await
            .unwrap();
        assert_eq!(stored.views, second.views);

        let unread = fixture
            .service
            .view(Some(&author), &draft.slug)
            .await
            .unwrap();
        assert_eq!(unread.views, 0);
    }

    #[tokio::test]
    async fn test_update_permission_denied_for_non_author() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;
        let other = make_user(&fixture, "bob", false).await;

        let post = fixture
            .service
            .create(&author, make_input("Owned Post", PostStatus::Published), vec![])
            .await
            .unwrap();

        let result = fixture
            .service
            .update(
                &other,
                post.id,
                UpdatePostInput {
                    status: Some(PostStatus::Archived),
                    ..Default::default()
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(PostServiceError::PermissionDenied(_))));

        assert!(fixture.service.delete(&other, post.id).await.is_err());
    }

    #[tokio::test]
    async fn test_slug_stable_unless_title_changes() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let post = fixture
            .service
            .create(&author, make_input("Stable Title", PostStatus::Published), vec![])
            .await
            .unwrap();

        let updated = fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    content: Some("z".repeat(90)),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, post.slug);

        let retitled = fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    title: Some("Fresh Title".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(retitled.slug, "fresh-title");
    }

    #[tokio::test]
    async fn test_retitle_to_held_slug_keeps_it() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;

        let post = fixture
            .service
            .create(&author, make_input("Hello World", PostStatus::Published), vec![])
            .await
            .unwrap();
        assert_eq!(post.slug, "hello-world");

        // Different title, same normalized slug: no spurious suffix
        let updated = fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    title: Some("Hello, World!".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "hello-world");
    }

    #[tokio::test]
    async fn test_nav_cache_invalidation_matrix() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;
        let category = fixture.categories.create("News", "news").await.unwrap();

        // Post create invalidates
        warm_nav_cache(&fixture).await;
        let post = fixture
            .service
            .create(&author, make_input("Nav Cache Post", PostStatus::Published), vec![])
            .await
            .unwrap();
        assert!(!nav_cache_is_warm(&fixture).await);

        // Title-only update leaves the cache warm
        warm_nav_cache(&fixture).await;
        fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    title: Some("Renamed Nav Post".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(nav_cache_is_warm(&fixture).await);

        // Category change invalidates
        warm_nav_cache(&fixture).await;
        fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    category_id: Some(Some(category.id)),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(!nav_cache_is_warm(&fixture).await);

        // Setting the same category again is not a change
        warm_nav_cache(&fixture).await;
        fixture
            .service
            .update(
                &author,
                post.id,
                UpdatePostInput {
                    category_id: Some(Some(category.id)),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(nav_cache_is_warm(&fixture).await);

        // Delete invalidates
        warm_nav_cache(&fixture).await;
        fixture.service.delete(&author, post.id).await.unwrap();
        assert!(!nav_cache_is_warm(&fixture).await);
    }

    #[tokio::test]
    async fn test_related_posts_share_category() {
        let fixture = setup().await;
        let author = make_user(&fixture, "alice", false).await;
        let category = fixture.categories.create("Rust", "rust").await.unwrap();

        let mut input = make_input("Anchor Post", PostStatus::Published);
        input.category_id = Some(category.id);
        let anchor = fixture.service.create(&author, input, vec![]).await.unwrap();

        let mut input = make_input("Sibling Post", PostStatus::Published);
        input.category_id = Some(category.id);
        fixture.service.create(&author, input, vec![]).await.unwrap();

        let mut input = make_input("Sibling Draft", PostStatus::Draft);
        input.category_id = Some(category.id);
        fixture.service.create(&author, input, vec![]).await.unwrap();

        fixture
            .service
            .create(&author, make_input("Unrelated Post", PostStatus::Published), vec![])
            .await
            .unwrap();

        let related = fixture.service.related(&anchor).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title, "Sibling Post");

        let uncategorized = fixture
            .service
            .get_by_slug(None, "unrelated-post")
            .await
            .unwrap();
        assert!(fixture.service.related(&uncategorized).await.unwrap().is_empty());
    }
}
