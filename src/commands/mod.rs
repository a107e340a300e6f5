//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and runs the operation against the database, printing projections
//! through [`Output`].

pub mod attach;
pub mod config;
pub mod list;
pub mod scan;
pub mod search;
pub mod tags;

use crate::FiletagError;
use crate::db::{Database, DbError, Id, Tag};
use crate::output::Output;
use crate::view::WebConverter;

pub(crate) type Result<T> = std::result::Result<T, FiletagError>;

/// What every store-backed command needs
pub struct Context<'a> {
    pub db: &'a Database,
    pub converter: WebConverter,
    pub out: Output,
}

impl<'a> Context<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, converter: WebConverter, out: Output) -> Self {
        Self { db, converter, out }
    }
}

/// Look a tag up by numeric id, falling back to its name
///
/// # Errors
/// Returns `DbError::NotFound` if neither matches.
pub fn resolve_tag(db: &Database, reference: &str) -> std::result::Result<Tag, DbError> {
    if let Ok(id) = reference.parse::<Id>() {
        match db.get_tag(id) {
            Err(DbError::NotFound { .. }) => {}
            other => return other,
        }
    }
    db.get_tag_by_name(reference)
}
