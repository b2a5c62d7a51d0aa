//! Database layer
//!
//! This module provides database access for the Gazette blog service on top
//! of SQLite via sqlx:
//! - connection pool creation (`create_pool`, `create_test_pool`)
//! - embedded code-based migrations (`migrations`)
//! - repository traits with sqlx implementations (`repositories`)

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
