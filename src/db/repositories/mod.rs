//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod category;
pub mod contact;
pub mod post;
pub mod session;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use contact::{ContactMessageRepository, SqlxContactMessageRepository};
pub use post::{PostRepository, PostScope, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
