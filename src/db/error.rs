//! Database-specific error types
//!
//! This module defines all error types that can occur during database operations.
//! Errors are properly categorized and include context for debugging.
//!
//! # Error Types
//!
//! - **`NotFound`**: A required single-entity lookup matched zero rows
//! - **`MultipleResults`**: More rows matched than a uniqueness invariant allows
//! - **`Unsupported`**: A query variant that cannot be resolved (e.g. ambiguous path)
//! - **`Conflict`**: A unique constraint or containment rule rejected a write
//! - **`InvalidSort`**: A list was asked to sort by a column it does not have
//! - **`AggregateDecode`**: A grouped id list could not be decoded
//! - **`Sqlite`**: Errors from the underlying SQLite engine
//!
//! All errors implement `std::error::Error` via the `thiserror` crate and provide
//! helpful error messages for debugging.

use std::fmt;
use thiserror::Error;

/// The kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    File,
    Folder,
    Tag,
}

impl Entity {
    /// Name of the table holding this entity
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// No row matched a lookup that requires exactly one
    #[error("No {entity} found for {key}")]
    NotFound { entity: Entity, key: String },

    /// More rows matched than the schema allows; signals an integrity break
    #[error("Found {count} {entity} rows for {key}, expected one")]
    MultipleResults {
        entity: Entity,
        key: String,
        count: usize,
    },

    /// The lookup is not defined for this input
    #[error("Unsupported query: {0}")]
    Unsupported(String),

    /// A write was rejected by a uniqueness or containment rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A sort key that is empty or names a column outside the whitelist
    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    /// A grouped id list held something other than integers
    #[error("Error while decoding aggregate '{0}'")]
    AggregateDecode(String),

    /// Represents an error from the SQLite engine
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database file or its directory could not be prepared
    #[error("Error while preparing database path: {0}")]
    PathError(String),
}

impl DbError {
    pub(crate) fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Map a unique-constraint failure to `Conflict`, leaving other errors untouched
    pub(crate) fn from_write(err: rusqlite::Error, context: impl FnOnce() -> String) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(context())
            }
            other => Self::Sqlite(other),
        }
    }

    /// True when the error is a `Conflict`
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
