//! Database module: models and schema for the `apod_data` table.
//!
//! Layout:
//! - `models.rs`: row structs and load outcomes
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `sqlite.rs`: storage handle with the schema, existence and insert queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{LoadOutcome, StoredRecord};
pub use schema::SQLITE_INIT;
pub use sqlite::{ApodStorage, SqlitePool};
