//! Millwright Data Layer
//!
//! Implements the [`DataAccess`](millwright_domain::traits::DataAccess)
//! boundary over SQLite. Every call returns data *plus* a citation
//! describing what was queried, so provenance survives from storage row to
//! final answer. Entity lookup falls back to fuzzy matching (normalize,
//! exact, substring, edit distance) and never guesses.
//!
//! # Examples
//!
//! ```no_run
//! use millwright_data::SqliteDataStore;
//!
//! let store = SqliteDataStore::open(":memory:").unwrap();
//! // Store is ready for read-only queries
//! ```

#![warn(missing_docs)]

pub mod fuzzy;
mod store;

pub use store::SqliteDataStore;

use thiserror::Error;

/// Errors that can occur during data-access operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data encountered while parsing a storage row
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
