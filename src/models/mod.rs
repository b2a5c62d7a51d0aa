//! Data models
//!
//! This module contains all data structures used throughout the Gazette blog
//! service. Models represent:
//! - Database entities (Post, Category, Tag, User, Session, ContactMessage)
//! - Input types for create/update operations
//! - Filter and pagination types shared by the query layer

mod category;
mod contact;
mod post;
mod session;
mod tag;
mod user;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use contact::{ContactMessage, ContactSubmission, MIN_MESSAGE_LENGTH};
pub use post::{
    CreatePostInput, ListParams, PagedResult, Post, PostFilter, PostStatus, UpdatePostInput,
    MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH, MIN_CONTENT_LENGTH, MIN_TITLE_LENGTH,
};
pub use session::Session;
pub use tag::Tag;
pub use user::{CreateUserInput, User};
