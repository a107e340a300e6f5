//! Search-specific error types
//!
//! This module defines error types specific to parsing search expressions and
//! running them against the store.
//!
//! # Error Types
//!
//! - **`MalformedQuery`**: The query text cannot be parsed (unbalanced group,
//!   unterminated literal, dangling operator)
//! - **`DatabaseError`**: Errors from database queries while loading candidates
//!   (wraps `DbError`)
//!
//! All errors implement proper error chaining and provide context for debugging.

use thiserror::Error;

/// Search-specific errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query text is not a valid search expression
    #[error("Malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    /// Database error occurred during search
    #[error("Database error: {0}")]
    DatabaseError(#[from] crate::db::DbError),
}

impl SearchError {
    pub(crate) fn malformed(query: &str, reason: impl Into<String>) -> Self {
        Self::MalformedQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
