use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while scanning directories into the store
#[derive(Debug, Error)]
pub enum IngestError {
    /// A configured path pattern failed to compile
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// A scan root does not exist
    #[error("Scan root '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),

    /// Database error other than a duplicate file
    #[error("Database error: {0}")]
    DatabaseError(#[from] crate::db::DbError),
}

impl IngestError {
    #[must_use]
    pub fn regex_compile(pattern: &str, reason: &str) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
