//! Post visibility policy
//!
//! Centralizes the rules governing what a requester may see and change:
//! - anonymous: published posts only, no writes
//! - authenticated non-staff: published posts plus their own, writes on own
//! - staff: everything
//!
//! List queries translate the requester into a `PostScope` pushed down to
//! the repository; detail reads and writes check individual posts here.

use crate::db::repositories::PostScope;
use crate::models::{Post, PostStatus, User};

/// Visibility scope for list queries, derived from the requester identity.
pub fn read_scope(viewer: Option<&User>) -> PostScope {
    match viewer {
        None => PostScope::PublishedOnly,
        Some(user) if user.is_staff => PostScope::All,
        Some(user) => PostScope::PublishedOrAuthor(user.id),
    }
}

/// Draft-listing restriction: staff see all drafts, everyone else only
/// their own. Anonymous requesters never reach this; the handler requires
/// authentication first.
pub fn draft_author_filter(viewer: &User) -> Option<i64> {
    if viewer.is_staff {
        None
    } else {
        Some(viewer.id)
    }
}

/// Whether a requester may read a single post.
pub fn can_view(viewer: Option<&User>, post: &Post) -> bool {
    if post.status == PostStatus::Published {
        return true;
    }
    match viewer {
        None => false,
        Some(user) => user.is_staff || user.id == post.author_id,
    }
}

/// Whether a requester may edit or delete a post. Author or staff only.
pub fn can_modify(viewer: &User, post: &Post) -> bool {
    viewer.can_edit(post.author_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(id: i64, is_staff: bool) -> User {
        let mut user = User::new(
            format!("user{}", id),
            format!("user{}@example.com", id),
            "hash".into(),
        );
        user.id = id;
        user.is_staff = is_staff;
        user
    }

    fn make_post(author_id: i64, status: PostStatus) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: "Title".into(),
            slug: "title".into(),
            content: "content".into(),
            author_id,
            category_id: None,
            status,
            created_at: now,
            updated_at: now,
            views: 0,
        }
    }

    #[test]
    fn test_read_scope_by_identity() {
        assert_eq!(read_scope(None), PostScope::PublishedOnly);

        let user = make_user(3, false);
        assert_eq!(read_scope(Some(&user)), PostScope::PublishedOrAuthor(3));

        let staff = make_user(4, true);
        assert_eq!(read_scope(Some(&staff)), PostScope::All);
    }

    #[test]
    fn test_published_visible_to_everyone() {
        let post = make_post(1, PostStatus::Published);
        assert!(can_view(None, &post));
        assert!(can_view(Some(&make_user(2, false)), &post));
    }

    #[test]
    fn test_draft_hidden_from_anonymous_and_others() {
        let post = make_post(1, PostStatus::Draft);
        assert!(!can_view(None, &post));
        assert!(!can_view(Some(&make_user(2, false)), &post));
        assert!(can_view(Some(&make_user(1, false)), &post));
        assert!(can_view(Some(&make_user(9, true)), &post));
    }

    #[test]
    fn test_archived_follows_draft_rules() {
        let post = make_post(1, PostStatus::Archived);
        assert!(!can_view(None, &post));
        assert!(can_view(Some(&make_user(1, false)), &post));
    }

    #[test]
    fn test_modify_author_or_staff_only() {
        let post = make_post(1, PostStatus::Published);
        assert!(can_modify(&make_user(1, false), &post));
        assert!(!can_modify(&make_user(2, false), &post));
        assert!(can_modify(&make_user(2, true), &post));
    }

    #[test]
    fn test_draft_author_filter() {
        assert_eq!(draft_author_filter(&make_user(5, false)), Some(5));
        assert_eq!(draft_author_filter(&make_user(5, true)), None);
    }
}
