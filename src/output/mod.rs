//! Output formatting for CLI display
//!
//! Projections are printed either as colored text lines or, with `--json`,
//! serialized as they are.

use crate::db::AutoComplete;
use crate::ingest::IngestReport;
use crate::view::{FolderSummary, WebAncestor, WebFile, WebFolder, WebTag};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Print an informational message; silent in quiet and JSON mode
    pub fn info(&self, message: impl Display) {
        if !self.quiet && !self.json {
            println!("{message}");
        }
    }

    /// Print one record
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the record cannot be serialized.
    pub fn item<T: Serialize>(
        &self,
        item: &T,
        render: impl Fn(&T, bool) -> String,
    ) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else {
            println!("{}", render(item, self.quiet));
        }
        Ok(())
    }

    /// Print a list of records, one line each
    ///
    /// # Errors
    /// Returns `serde_json::Error` if the records cannot be serialized.
    pub fn items<T: Serialize>(
        &self,
        items: &[T],
        render: impl Fn(&T, bool) -> String,
    ) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
            return Ok(());
        }
        for item in items {
            println!("{}", render(item, self.quiet));
        }
        Ok(())
    }
}

/// Color a path based on file existence (green if exists, red if missing)
#[must_use]
pub fn colorize_path(path: &str) -> String {
    if Path::new(path).exists() {
        path.green().to_string()
    } else {
        path.red().to_string()
    }
}

/// Comma separated tag names
#[must_use]
pub fn tag_names(tags: &[WebTag]) -> String {
    tags.iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn with_tags(head: String, tags: &[WebTag]) -> String {
    if tags.is_empty() {
        format!("{head} {}", "(no tags)".dimmed())
    } else {
        format!("{head} [{}]", tag_names(tags).cyan())
    }
}

#[must_use]
pub fn file_line(file: &WebFile, quiet: bool) -> String {
    if quiet {
        return file.path.clone();
    }
    let head = format!("{:>6}  {}", file.id, colorize_path(&file.path));
    with_tags(head, &file.tags)
}

#[must_use]
pub fn folder_line(folder: &WebFolder, quiet: bool) -> String {
    if quiet {
        return folder.path.clone();
    }
    let head = format!("{:>6}  {}/", folder.id, folder.path.blue().bold());
    with_tags(head, &folder.tags)
}

#[must_use]
pub fn summary_line(folder: &FolderSummary, quiet: bool) -> String {
    if quiet {
        folder.path.clone()
    } else {
        format!("{:>6}  {}/", folder.id, folder.path.blue().bold())
    }
}

/// Format a tag with usage count
#[must_use]
pub fn tag_line(tag: &WebTag, quiet: bool) -> String {
    if quiet {
        return tag.name.clone();
    }
    let line = format!("{:>6}  {} (used {} time(s))", tag.id, tag.name.cyan(), tag.count);
    match &tag.description {
        Some(description) => format!("{line}  {}", description.dimmed()),
        None => line,
    }
}

#[must_use]
pub fn completion_line(item: &AutoComplete, _quiet: bool) -> String {
    item.value.clone()
}

/// `~ / photos / 2020` with the current crumb highlighted
#[must_use]
pub fn breadcrumbs(ancestry: &[WebAncestor]) -> String {
    ancestry
        .iter()
        .map(|crumb| {
            if crumb.current {
                crumb.name.bold().to_string()
            } else {
                crumb.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Full file page: path, metadata, tags and parent folder
#[must_use]
pub fn file_page(file: &WebFile, quiet: bool) -> String {
    if quiet {
        return file.path.clone();
    }
    let mut lines = vec![format!("{} {}", "File".bold(), colorize_path(&file.path))];
    lines.push(format!("  id:     {}", file.id));
    if let Some(name) = &file.name {
        lines.push(format!("  name:   {name}"));
    }
    if let Some(mime) = &file.mime {
        lines.push(format!("  mime:   {mime}"));
    }
    if let Some(description) = &file.description {
        lines.push(format!("  note:   {description}"));
    }
    lines.push(format!("  tags:   {}", tag_names(&file.tags)));
    if let Some(parent) = &file.parent {
        lines.push(format!("  folder: {}", parent.path));
    }
    lines.join("\n")
}

/// Full folder page: breadcrumbs, subfolders and files
#[must_use]
pub fn folder_page(folder: &WebFolder, quiet: bool) -> String {
    if quiet {
        return folder
            .folders
            .iter()
            .map(|f| f.path.clone())
            .chain(folder.files.iter().map(|f| f.path.clone()))
            .collect::<Vec<_>>()
            .join("\n");
    }
    let mut lines = vec![breadcrumbs(&folder.ancestry)];
    if let Some(description) = &folder.description {
        lines.push(description.dimmed().to_string());
    }
    if !folder.tags.is_empty() {
        lines.push(format!("tags: {}", tag_names(&folder.tags).cyan()));
    }
    lines.extend(folder.folders.iter().map(|f| summary_line(f, false)));
    lines.extend(folder.files.iter().map(|f| file_line(f, false)));
    lines.join("\n")
}

#[must_use]
pub fn report(report: &IngestReport, quiet: bool) -> String {
    if quiet {
        return report.inserted.to_string();
    }
    format!(
        "Indexed {} new file(s) in {} new folder(s); {} already indexed, {} filtered out",
        report.inserted.to_string().green(),
        report.folders,
        report.duplicates,
        report.rejected
    )
}
