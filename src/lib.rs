//! Filetag - tag, search and browse files indexed in an embedded database
//!
//! This library indexes files and folders into SQLite, annotates them with
//! tags, evaluates boolean tag queries against them and turns the results
//! into presentation records.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod ingest;
pub mod output;
pub mod search;
pub mod view;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum FiletagError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Search error
    #[error("Search error: {0}")]
    SearchError(#[from] search::SearchError),
    /// Ingestion error
    #[error("Scan error: {0}")]
    IngestError(#[from] ingest::IngestError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Transport-neutral classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MalformedQuery,
    MultipleResults,
    Conflict,
    Unsupported,
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport would answer with
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::MalformedQuery => 400,
            Self::Conflict => 409,
            Self::Unsupported => 501,
            Self::MultipleResults | Self::Internal => 500,
        }
    }

    /// Process exit code for the CLI
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::NotFound => 2,
            Self::MalformedQuery => 3,
            Self::Conflict => 4,
            Self::Unsupported => 5,
            Self::MultipleResults | Self::Internal => 1,
        }
    }
}

fn db_kind(err: &db::DbError) -> ErrorKind {
    match err {
        db::DbError::NotFound { .. } => ErrorKind::NotFound,
        db::DbError::MultipleResults { .. } => ErrorKind::MultipleResults,
        db::DbError::Unsupported(_) => ErrorKind::Unsupported,
        db::DbError::Conflict(_) => ErrorKind::Conflict,
        db::DbError::InvalidSort(_) => ErrorKind::MalformedQuery,
        _ => ErrorKind::Internal,
    }
}

impl FiletagError {
    /// Classify the error, looking through wrapped database errors
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DbError(e)
            | Self::SearchError(search::SearchError::DatabaseError(e))
            | Self::IngestError(ingest::IngestError::DatabaseError(e)) => db_kind(e),
            Self::SearchError(search::SearchError::MalformedQuery { .. })
            | Self::InvalidInput(_) => ErrorKind::MalformedQuery,
            _ => ErrorKind::Internal,
        }
    }
}
