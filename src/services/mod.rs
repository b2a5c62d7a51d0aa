//! Business logic services
//!
//! Services sit between the API layer and the repositories. Each service
//! owns validation, visibility decisions, and cache invalidation for its
//! entity; repositories stay dumb.

pub mod category;
pub mod challenge;
pub mod contact;
pub mod email;
pub mod password;
pub mod policy;
pub mod post;
pub mod sanitize;
pub mod slug;
pub mod tag;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use challenge::{ChallengeVerifier, HttpChallengeVerifier};
pub use contact::{ContactService, ContactServiceError};
pub use email::{NotificationDispatcher, SmtpMailer};
pub use post::{PostService, PostServiceError};
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
