/*!
 * Storage module for records and their translations.
 *
 * This module provides:
 * - The `Repository` trait consumed by the translatable layer
 * - A SQLite implementation over application-managed tables
 * - An in-memory implementation with failure injection
 * - The dirty-tracked `Record` model shared by all of them
 */

pub mod connection;
pub mod memory;
pub mod models;
pub mod repository;

// Re-export main types
pub use connection::DatabaseConnection;
pub use memory::{MemoryRepository, SaveAttempt};
pub use models::Record;
pub use repository::{Repository, SqliteRepository};
