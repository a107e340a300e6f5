//! Attach and detach commands - edit the tag set of one file or folder

use super::{Context, Result};
use crate::cli::Target;
use crate::db::{Database, Id, TagOwner};
use crate::output;

const fn owner(target: Target) -> TagOwner {
    match target {
        Target::File => TagOwner::File,
        Target::Folder => TagOwner::Folder,
    }
}

/// Add the named tags to the target and return its new tag ids
///
/// Unknown names become new tags in the same transaction.
///
/// # Errors
/// Returns `DbError::NotFound` if the target does not exist.
pub fn attach(db: &Database, target: Target, id: Id, names: &[String]) -> Result<Vec<Id>> {
    Ok(db.attach_tags(owner(target), id, names)?)
}

/// Remove the named tags from the target and return its new tag ids
///
/// # Errors
/// Returns `DbError::NotFound` if the target or one of the tags does not exist.
pub fn detach(db: &Database, target: Target, id: Id, names: &[String]) -> Result<Vec<Id>> {
    Ok(db.detach_tags(owner(target), id, names)?)
}

/// Execute `attach` (or `detach` when `remove` is set) and print the result
///
/// # Errors
/// Returns an error if the target or a detached tag does not exist.
pub fn execute(
    ctx: &Context<'_>,
    target: Target,
    id: Id,
    names: &[String],
    remove: bool,
) -> Result<()> {
    if remove {
        detach(ctx.db, target, id, names)?;
    } else {
        attach(ctx.db, target, id, names)?;
    }

    match target {
        Target::File => {
            let page = ctx.converter.file_page(ctx.db, id)?;
            ctx.out.item(&page, output::file_line)?;
        }
        Target::Folder => {
            let folder = ctx.db.get_folder(id)?;
            let projected = ctx.converter.folders(ctx.db, &[folder])?;
            ctx.out.items(&projected, output::folder_line)?;
        }
    }
    Ok(())
}
