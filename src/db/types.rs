//! Entity and request types for the file/folder/tag store
//!
//! Entities are plain records with every nullable column declared as `Option`.
//! Derived fields (`tags`, `files`, `folders`, `parent_folder_id`, `count`) are
//! aggregates computed by the query layer, never stored on the row itself.
//!
//! Write operations take one explicit request struct each, so a create call
//! cannot be confused with a partial modify.

use super::error::DbError;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Row identifier shared by all entities
pub type Id = i64;

/// Separator used by `GROUP_CONCAT` for aggregated id lists
pub const AGGREGATE_DELIMITER: char = ',';

/// An indexed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: Id,
    pub path: String,
    pub mime: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Tag ids attached to this file, ascending
    #[serde(default)]
    pub tags: Vec<Id>,
    /// Owning folder, if any
    pub parent_folder_id: Option<Id>,
}

impl File {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, DbError> {
        Ok(Self {
            id: row.get("id")?,
            path: row.get("path")?,
            mime: row.get("mime")?,
            name: row.get("name")?,
            description: row.get("description")?,
            tags: parse_id_list(row.get::<_, Option<String>>("tags")?.as_deref())?,
            parent_folder_id: row.get("parent_folder_id")?,
        })
    }
}

/// An indexed folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Id,
    pub path: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Tag ids attached to this folder, ascending
    #[serde(default)]
    pub tags: Vec<Id>,
    /// Files directly contained in this folder
    #[serde(default)]
    pub files: Vec<Id>,
    /// Child folders
    #[serde(default)]
    pub folders: Vec<Id>,
}

impl Folder {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, DbError> {
        Ok(Self {
            id: row.get("id")?,
            path: row.get("path")?,
            name: row.get("name")?,
            description: row.get("description")?,
            tags: parse_id_list(row.get::<_, Option<String>>("tags")?.as_deref())?,
            files: parse_id_list(row.get::<_, Option<String>>("files")?.as_deref())?,
            folders: parse_id_list(row.get::<_, Option<String>>("folders")?.as_deref())?,
        })
    }
}

/// A tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    /// Number of distinct files plus folders referencing this tag
    #[serde(default)]
    pub count: i64,
}

impl Tag {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, DbError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            count: row.get("count")?,
        })
    }
}

/// Autocomplete candidate for a tag name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoComplete {
    /// The tag name as stored
    pub label: String,
    /// The name with spaces replaced by `_`, usable as a bareword
    pub value: String,
}

/// Decode a `GROUP_CONCAT` aggregate into ascending, de-duplicated ids
///
/// `None` and the empty string both decode to an empty list.
///
/// # Errors
///
/// Returns `DbError::AggregateDecode` if an element is not an integer.
///
/// # Examples
/// ```
/// # use filetag::db::types::parse_id_list;
/// assert_eq!(parse_id_list(Some("3,1,2")).unwrap(), vec![1, 2, 3]);
/// assert!(parse_id_list(None).unwrap().is_empty());
/// ```
pub fn parse_id_list(raw: Option<&str>) -> Result<Vec<Id>, DbError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut ids = raw
        .split(AGGREGATE_DELIMITER)
        .map(|part| {
            part.trim()
                .parse::<Id>()
                .map_err(|_| DbError::AggregateDecode(raw.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Request to create a file row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFileRequest {
    pub path: String,
    pub mime: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Id>,
    /// Folder that contains the file, linked in the same transaction
    #[serde(default)]
    pub folder_id: Option<Id>,
}

impl CreateFileRequest {
    /// Create a request for `path` with no metadata
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Request to change some fields of a file; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyFileRequest {
    pub id: Id,
    pub path: Option<String>,
    pub mime: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces the tag set exactly when present
    pub tags: Option<Vec<Id>>,
}

/// Request to create a folder row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub path: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Id>,
}

impl CreateFolderRequest {
    /// Create a request for `path` with no metadata
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Request to change some fields of a folder; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyFolderRequest {
    pub id: Id,
    pub path: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<Id>>,
}

/// Place `child_id` inside `parent_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSubfolderRequest {
    pub parent_id: Id,
    pub child_id: Id,
}

/// Place `file_id` inside `folder_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFileToFolderRequest {
    pub folder_id: Id,
    pub file_id: Id,
}

/// Request to create a tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateTagRequest {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Request to rename or re-describe a tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyTagRequest {
    pub id: Id,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
