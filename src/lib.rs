//! Gazette - a multi-user blogging backend
//!
//! This library provides the core functionality for the Gazette blog service.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
