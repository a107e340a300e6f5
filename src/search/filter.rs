//! Query filtering over files and folders
//!
//! Candidates carry tag ids, while queries name tags. Filtering resolves
//! every id seen across the candidate set with a single `get_tags` call and
//! then evaluates the query per candidate in memory.
//!
//! # Iterator Adapters
//!
//! [`QueryFilterExt`] adds fluent filtering to any iterator of [`Taggable`]
//! items:
//!
//! ```ignore
//! use filetag::search::filter::QueryFilterExt;
//!
//! let matching = db
//!     .get_orphaned_files()?
//!     .filter_query(&db, &query, SearchOptions::default())?;
//! ```

use super::expr::Candidate;
use super::{Query, SearchError, SearchOptions};
use crate::db::{Database, File, Folder, Id};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

/// An entity with tag ids and a name literals may match
pub trait Taggable {
    fn tag_ids(&self) -> &[Id];

    /// The stored name, falling back to the last path component
    fn display_name(&self) -> Option<&str>;
}

fn last_component(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(OsStr::to_str)
}

impl Taggable for File {
    fn tag_ids(&self) -> &[Id] {
        &self.tags
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| last_component(&self.path))
    }
}

impl Taggable for Folder {
    fn tag_ids(&self) -> &[Id] {
        &self.tags
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| last_component(&self.path))
    }
}

/// Resolve tag ids to names with one store round trip
///
/// # Errors
///
/// Returns `SearchError::DatabaseError` if the tags cannot be loaded.
pub fn tag_names(
    db: &Database,
    ids: impl IntoIterator<Item = Id>,
) -> Result<HashMap<Id, String>, SearchError> {
    let ids: Vec<Id> = ids.into_iter().collect();
    Ok(db
        .get_tags(&ids)?
        .into_iter()
        .map(|tag| (tag.id, tag.name))
        .collect())
}

/// Build the candidate for `item`; ids without a known name are skipped
#[must_use]
pub fn candidate<T: Taggable>(
    item: &T,
    names: &HashMap<Id, String>,
    options: SearchOptions,
) -> Candidate {
    let mut candidate = Candidate::new(
        item.tag_ids()
            .iter()
            .filter_map(|id| names.get(id).cloned()),
    );
    if options.match_names {
        candidate.name = item.display_name().map(str::to_string);
    }
    candidate
}

/// Keep the items matching `query`
///
/// # Errors
///
/// Returns `SearchError::DatabaseError` if tag names cannot be resolved.
pub fn by_query<T: Taggable>(
    items: Vec<T>,
    db: &Database,
    query: &Query,
    options: SearchOptions,
) -> Result<Vec<T>, SearchError> {
    if query.matches_everything() {
        return Ok(items);
    }
    let names = tag_names(db, items.iter().flat_map(|item| item.tag_ids().iter().copied()))?;
    Ok(items
        .into_iter()
        .filter(|item| query.matches(&candidate(item, &names, options)))
        .collect())
}

/// Extension trait for filtering iterators of taggable entities by a query
pub trait QueryFilterExt<T: Taggable>: IntoIterator<Item = T> + Sized {
    /// Keep the items matching `query`
    ///
    /// # Errors
    ///
    /// Returns `SearchError::DatabaseError` if tag names cannot be resolved.
    fn filter_query(
        self,
        db: &Database,
        query: &Query,
        options: SearchOptions,
    ) -> Result<Vec<T>, SearchError> {
        by_query(self.into_iter().collect(), db, query, options)
    }
}

impl<T: Taggable, I> QueryFilterExt<T> for I where I: IntoIterator<Item = T> {}

/// Every file matching `query`, ordered by id
///
/// # Errors
///
/// Returns `SearchError::DatabaseError` if the store cannot be queried.
pub fn search_files(
    db: &Database,
    query: &Query,
    options: SearchOptions,
) -> Result<Vec<File>, SearchError> {
    db.get_all_files()?.filter_query(db, query, options)
}

/// Every folder matching `query`, ordered by id
///
/// # Errors
///
/// Returns `SearchError::DatabaseError` if the store cannot be queried.
pub fn search_folders(
    db: &Database,
    query: &Query,
    options: SearchOptions,
) -> Result<Vec<Folder>, SearchError> {
    db.get_all_folders()?.filter_query(db, query, options)
}
