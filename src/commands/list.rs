//! Status, files and folders commands - show what is indexed

use super::{Context, Result};
use crate::FiletagError;
use crate::cli::ListArgs;
use crate::db::{File, FileQuery, Folder, FolderQuery, Id};
use crate::output;
use serde::Serialize;

/// Entity counts shown by `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
    pub files: usize,
    pub folders: usize,
    pub tags: usize,
}

fn status_line(status: &Status, quiet: bool) -> String {
    if quiet {
        format!("{} {} {}", status.files, status.folders, status.tags)
    } else {
        format!(
            "{} file(s), {} folder(s), {} tag(s)",
            status.files, status.folders, status.tags
        )
    }
}

/// Print entity counts
///
/// # Errors
/// Returns an error if the database cannot be queried.
pub fn status(ctx: &Context<'_>) -> Result<()> {
    let status = Status {
        files: ctx.db.count_files()?,
        folders: ctx.db.count_folders()?,
        tags: ctx.db.count_tags()?,
    };
    ctx.out.info(format!("Database: {}", ctx.db.path().display()));
    ctx.out.item(&status, status_line)?;
    Ok(())
}

fn ids_with_list_args() -> FiletagError {
    FiletagError::InvalidInput("--sort, --limit and --offset apply to listings, not to ids".into())
}

/// Which files `files` selects
fn select_files(
    ctx: &Context<'_>,
    ids: &[Id],
    orphaned: bool,
    list: &ListArgs,
) -> Result<Vec<File>> {
    if !ids.is_empty() {
        if !list.is_default() {
            return Err(ids_with_list_args());
        }
        return Ok(ctx.db.get_files(ids)?);
    }
    let query = if orphaned { FileQuery::Orphaned } else { FileQuery::All };
    Ok(ctx.db.list_files(&query, &list.options())?)
}

/// Show files; one id or a path shows the full file page
///
/// # Errors
/// Returns `DbError::NotFound` if a requested file does not exist and
/// `DbError::InvalidSort` for an unknown sort column.
pub fn files(
    ctx: &Context<'_>,
    ids: &[Id],
    orphaned: bool,
    path: Option<&str>,
    list: &ListArgs,
) -> Result<()> {
    let single = match (path, ids) {
        (Some(path), _) => Some(ctx.db.get_file_by_path(path)?.id),
        (None, [id]) => Some(*id),
        _ => None,
    };
    if let Some(id) = single {
        let page = ctx.converter.file_page(ctx.db, id)?;
        ctx.out.item(&page, output::file_page)?;
        return Ok(());
    }

    let files = select_files(ctx, ids, orphaned, list)?;
    if files.is_empty() {
        ctx.out.info("No files found.");
        return Ok(());
    }
    let projected = ctx.converter.files(ctx.db, &files)?;
    ctx.out.items(&projected, output::file_line)?;
    Ok(())
}

fn select_folders(
    ctx: &Context<'_>,
    ids: &[Id],
    root: bool,
    list: &ListArgs,
) -> Result<Vec<Folder>> {
    if !ids.is_empty() {
        if !list.is_default() {
            return Err(ids_with_list_args());
        }
        return Ok(ctx.db.get_folders(ids)?);
    }
    let query = if root { FolderQuery::Root } else { FolderQuery::All };
    Ok(ctx.db.list_folders(&query, &list.options())?)
}

/// Show folders; one id or a path shows the full folder page
///
/// # Errors
/// Returns `DbError::NotFound` if a requested folder does not exist and
/// `DbError::Unsupported` for an empty or ambiguous path.
pub fn folders(
    ctx: &Context<'_>,
    ids: &[Id],
    root: bool,
    path: Option<&str>,
    list: &ListArgs,
) -> Result<()> {
    let single = match (path, ids) {
        (Some(path), _) => Some(ctx.db.get_folder_by_path(path)?.id),
        (None, [id]) => Some(*id),
        _ => None,
    };
    if let Some(id) = single {
        let page = ctx.converter.folder_page(ctx.db, id)?;
        ctx.out.item(&page, output::folder_page)?;
        return Ok(());
    }

    let folders = select_folders(ctx, ids, root, list)?;
    if folders.is_empty() {
        ctx.out.info("No folders found.");
        return Ok(());
    }
    let projected = ctx.converter.folders(ctx.db, &folders)?;
    ctx.out.items(&projected, output::folder_line)?;
    Ok(())
}
