//! Projection of store entities into presentation records
//!
//! [`WebConverter`] decorates files, folders and tags with page links,
//! icons, previews and resolved tags. Rendering them is left to the caller.

pub mod converter;
pub mod routes;
pub mod types;

pub use converter::{TagLookup, WebConverter, collect_tag_ids, icon_for_mime, is_previewable};
pub use routes::{Routes, reformat};
pub use types::{FolderSummary, WebAncestor, WebFile, WebFolder, WebTag};
