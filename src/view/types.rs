//! Presentation records
//!
//! Nested references only ever point at [`FolderSummary`], which has no
//! lists of its own, so a projection can never contain itself.

use crate::db::Id;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebTag {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub count: i64,
    pub page: String,
}

/// A folder as it appears inside another projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub id: Id,
    pub path: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub page: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebFile {
    pub id: Id,
    pub path: String,
    pub mime: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub page: String,
    pub icon: String,
    pub preview: String,
    /// Sorted by name
    pub tags: Vec<WebTag>,
    pub parent: Option<FolderSummary>,
}

/// A full folder page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebFolder {
    pub id: Id,
    pub path: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub page: String,
    pub icon: String,
    /// Sorted by name
    pub tags: Vec<WebTag>,
    pub files: Vec<WebFile>,
    pub folders: Vec<FolderSummary>,
    /// Breadcrumbs from the root down to this folder
    pub ancestry: Vec<WebAncestor>,
}

/// One breadcrumb
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebAncestor {
    pub name: String,
    pub page: String,
    /// Set on the last breadcrumb only
    pub current: bool,
}
