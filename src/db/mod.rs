//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - The SQLite-backed user store
//! - Database migrations
//! - Data models and schemas

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;

pub use manager::DatabaseManager;
pub use models::{Folder, User};
pub use repository::UserRepository;
