//! Folder lookups, folder writes and containment links

use super::query::{self, FolderQuery, ListOptions};
use super::tag::{TagOwner, set_tags};
use super::types::{
    AddFileToFolderRequest, AddSubfolderRequest, CreateFolderRequest, Folder, Id,
    ModifyFolderRequest,
};
use super::{Database, DbError, Entity, require_exists};
use rusqlite::{Connection, params, params_from_iter};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Parent of `child_id` in the folder-folder association, if any
fn parent_of(conn: &Connection, child_id: Id) -> Result<Option<Id>, DbError> {
    let parent = conn.query_row(
        "SELECT MIN(parent_id) FROM folder_folder WHERE child_id = ?1",
        [child_id],
        |row| row.get(0),
    )?;
    Ok(parent)
}

/// Walk the parent chain upwards from `id`, `id` first
///
/// Stops on a revisited id so a corrupt cycle cannot loop forever.
fn ancestor_ids(conn: &Connection, id: Id) -> Result<Vec<Id>, DbError> {
    let mut chain = vec![id];
    let mut seen = HashSet::from([id]);
    let mut current = id;
    while let Some(parent) = parent_of(conn, current)? {
        if !seen.insert(parent) {
            warn!(folder = id, revisited = parent, "cycle in folder ancestry");
            break;
        }
        chain.push(parent);
        current = parent;
    }
    Ok(chain)
}

impl Database {
    /// Get a single folder by id
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no folder has this id.
    pub fn get_folder(&self, id: Id) -> Result<Folder, DbError> {
        let query = FolderQuery::ById(id);
        self.fetch_one(Entity::Folder, &query, query.statements(), Folder::from_row)
    }

    /// Get the folders whose ids appear in `ids`, ordered by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_folders(&self, ids: &[Id]) -> Result<Vec<Folder>, DbError> {
        self.fetch_all(FolderQuery::ByIds(ids.to_vec()).statements(), Folder::from_row)
    }

    /// Get every folder that is not a child of another folder
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_root_folders(&self) -> Result<Vec<Folder>, DbError> {
        self.fetch_all(FolderQuery::Root.statements(), Folder::from_row)
    }

    /// Get the folder stored under `path`
    ///
    /// Folder paths are not unique in the schema, so an ambiguous path is
    /// reported rather than resolved arbitrarily.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if nothing matches and `DbError::Unsupported`
    /// for an empty path or a path shared by several folders.
    pub fn get_folder_by_path(&self, path: &str) -> Result<Folder, DbError> {
        if path.is_empty() {
            return Err(DbError::Unsupported("folder lookup by empty path".into()));
        }
        let query = FolderQuery::ByPath(path.to_string());
        self.fetch_one(Entity::Folder, &query, query.statements(), Folder::from_row)
            .map_err(|e| match e {
                DbError::MultipleResults { count, .. } => DbError::Unsupported(format!(
                    "path '{path}' is shared by {count} folders"
                )),
                other => other,
            })
    }

    /// Get every folder ordered by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_all_folders(&self) -> Result<Vec<Folder>, DbError> {
        self.fetch_all(FolderQuery::All.statements(), Folder::from_row)
    }

    /// List all folders, or only the root ones, in the given order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for an unknown sort column and
    /// `DbError::Unsupported` when `query` is a lookup rather than a list.
    pub fn list_folders(
        &self,
        query: &FolderQuery,
        options: &ListOptions,
    ) -> Result<Vec<Folder>, DbError> {
        self.fetch_all(vec![query.listed(options)?], Folder::from_row)
    }

    /// Get the chain of folders from the root down to `id`, inclusive
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the folder does not exist.
    pub fn get_folder_ancestry(&self, id: Id) -> Result<Vec<Folder>, DbError> {
        let conn = self.connect()?;
        require_exists(&conn, Entity::Folder, id)?;
        let mut chain = ancestor_ids(&conn, id)?;
        drop(conn);

        chain.reverse();
        let mut folders = self.get_folders(&chain)?;
        // get_folders orders by id; restore root-first order
        folders.sort_by_key(|folder| chain.iter().position(|id| *id == folder.id));
        Ok(folders)
    }

    /// Insert a folder and its initial tags atomically
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if one of the tags does not exist.
    pub fn create_folder(&self, request: &CreateFolderRequest) -> Result<Folder, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO folder(path, name, description) VALUES (?1, ?2, ?3)",
            params![request.path, request.name, request.description],
        )?;
        let id = tx.last_insert_rowid();
        set_tags(&tx, TagOwner::Folder, id, &request.tags)?;
        tx.commit()?;
        drop(conn);

        debug!(id, path = %request.path, "created folder");
        self.get_folder(id)
    }

    /// Change the fields present in `request`
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the folder or a requested tag does not exist.
    pub fn modify_folder(&self, request: &ModifyFolderRequest) -> Result<Folder, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::Folder, request.id)?;

        let columns = query::changed_columns(&[
            ("path", request.path.as_ref()),
            ("name", request.name.as_ref()),
            ("description", request.description.as_ref()),
        ]);
        if let Some(statement) = query::update("folder", request.id, columns) {
            tx.execute(&statement.sql, params_from_iter(statement.params.iter()))?;
        }
        if let Some(tags) = &request.tags {
            set_tags(&tx, TagOwner::Folder, request.id, tags)?;
        }
        tx.commit()?;
        drop(conn);

        self.get_folder(request.id)
    }

    /// Delete a folder and every association row naming it
    ///
    /// Child folders and files are unlinked, not deleted.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the folder does not exist.
    pub fn delete_folder(&self, id: Id) -> Result<(), DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::Folder, id)?;
        tx.execute("DELETE FROM folder_tag WHERE folder_id = ?1", [id])?;
        tx.execute("DELETE FROM folder_file WHERE folder_id = ?1", [id])?;
        tx.execute(
            "DELETE FROM folder_folder WHERE parent_id = ?1 OR child_id = ?1",
            [id],
        )?;
        tx.execute("DELETE FROM folder WHERE id = ?1", [id])?;
        tx.commit()?;
        debug!(id, "deleted folder");
        Ok(())
    }

    /// Make `child_id` a subfolder of `parent_id`
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if either folder is missing and
    /// `DbError::Conflict` if the child already has a parent or the link
    /// would close a cycle.
    pub fn add_subfolder(&self, request: &AddSubfolderRequest) -> Result<(), DbError> {
        let AddSubfolderRequest {
            parent_id,
            child_id,
        } = *request;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::Folder, parent_id)?;
        require_exists(&tx, Entity::Folder, child_id)?;

        if parent_id == child_id {
            return Err(DbError::Conflict(format!(
                "folder {child_id} cannot contain itself"
            )));
        }
        if let Some(existing) = parent_of(&tx, child_id)? {
            return Err(DbError::Conflict(format!(
                "folder {child_id} already belongs to folder {existing}"
            )));
        }
        if ancestor_ids(&tx, parent_id)?.contains(&child_id) {
            return Err(DbError::Conflict(format!(
                "folder {parent_id} is inside folder {child_id}"
            )));
        }

        tx.execute(
            "INSERT INTO folder_folder(parent_id, child_id) VALUES (?1, ?2)",
            params![parent_id, child_id],
        )
        .map_err(|e| {
            DbError::from_write(e, || {
                format!("folder {child_id} already belongs to folder {parent_id}")
            })
        })?;
        tx.commit()?;
        debug!(parent_id, child_id, "linked subfolder");
        Ok(())
    }

    /// Place a file inside a folder
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the folder or file is missing and
    /// `DbError::Conflict` if the file already belongs to a folder.
    pub fn add_file_to_folder(&self, request: &AddFileToFolderRequest) -> Result<(), DbError> {
        let AddFileToFolderRequest { folder_id, file_id } = *request;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        link_file(&tx, folder_id, file_id)?;
        tx.commit()?;
        debug!(folder_id, file_id, "linked file");
        Ok(())
    }
}

/// Insert the folder-file link, keeping each file in at most one folder
///
/// Does not commit.
pub(crate) fn link_file(conn: &Connection, folder_id: Id, file_id: Id) -> Result<(), DbError> {
    require_exists(conn, Entity::Folder, folder_id)?;
    require_exists(conn, Entity::File, file_id)?;

    let existing: Option<Id> = conn.query_row(
        "SELECT MIN(folder_id) FROM folder_file WHERE file_id = ?1",
        [file_id],
        |row| row.get(0),
    )?;
    if let Some(existing) = existing {
        return Err(DbError::Conflict(format!(
            "file {file_id} already belongs to folder {existing}"
        )));
    }

    conn.execute(
        "INSERT INTO folder_file(folder_id, file_id) VALUES (?1, ?2)",
        params![folder_id, file_id],
    )?;
    Ok(())
}
