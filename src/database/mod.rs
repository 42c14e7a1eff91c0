/*!
 * Database module for persistent storage of glossaries.
 *
 * This module provides SQLite-based persistence for:
 * - Glossaries and their term entries
 * - Mappings between local glossaries and remote provider glossaries
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
