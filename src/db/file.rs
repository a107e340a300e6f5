//! File lookups and file writes

use super::query::{self, FileQuery, ListOptions};
use super::folder::link_file;
use super::tag::{TagOwner, set_tags};
use super::types::{CreateFileRequest, File, Id, ModifyFileRequest};
use super::{Database, DbError, Entity, require_exists};
use rusqlite::{params, params_from_iter};
use tracing::debug;

impl Database {
    /// Get a single file by id
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no file has this id.
    pub fn get_file(&self, id: Id) -> Result<File, DbError> {
        let query = FileQuery::ById(id);
        self.fetch_one(Entity::File, &query, query.statements(), File::from_row)
    }

    /// Get the files whose ids appear in `ids`, ordered by id
    ///
    /// Unknown ids are skipped and an empty id set returns an empty list
    /// without querying the store.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_files(&self, ids: &[Id]) -> Result<Vec<File>, DbError> {
        self.fetch_all(FileQuery::ByIds(ids.to_vec()).statements(), File::from_row)
    }

    /// Get every file that no folder contains
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_orphaned_files(&self) -> Result<Vec<File>, DbError> {
        self.fetch_all(FileQuery::Orphaned.statements(), File::from_row)
    }

    /// Get a file by its unique path
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no file has this path.
    pub fn get_file_by_path(&self, path: &str) -> Result<File, DbError> {
        let query = FileQuery::ByPath(path.to_string());
        self.fetch_one(Entity::File, &query, query.statements(), File::from_row)
    }

    /// Get every file ordered by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_all_files(&self) -> Result<Vec<File>, DbError> {
        self.fetch_all(FileQuery::All.statements(), File::from_row)
    }

    /// List all files, or only the orphaned ones, in the given order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for an unknown sort column and
    /// `DbError::Unsupported` when `query` is a lookup rather than a list.
    pub fn list_files(
        &self,
        query: &FileQuery,
        options: &ListOptions,
    ) -> Result<Vec<File>, DbError> {
        self.fetch_all(vec![query.listed(options)?], File::from_row)
    }

    /// Insert a file, its initial tags and its folder link atomically
    ///
    /// # Errors
    ///
    /// Returns `DbError::Conflict` if the path is already indexed and
    /// `DbError::NotFound` if one of the tags or the folder does not exist.
    /// Nothing is written in either case.
    pub fn create_file(&self, request: &CreateFileRequest) -> Result<File, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO file(path, mime, name, description) VALUES (?1, ?2, ?3, ?4)",
            params![request.path, request.mime, request.name, request.description],
        )
        .map_err(|e| DbError::from_write(e, || format!("file '{}' already exists", request.path)))?;
        let id = tx.last_insert_rowid();
        set_tags(&tx, TagOwner::File, id, &request.tags)?;
        if let Some(folder_id) = request.folder_id {
            link_file(&tx, folder_id, id)?;
        }
        tx.commit()?;
        drop(conn);

        debug!(id, path = %request.path, folder_id = ?request.folder_id, "created file");
        self.get_file(id)
    }

    /// Change the fields present in `request`
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the file or a requested tag does not
    /// exist and `DbError::Conflict` if the new path is taken.
    pub fn modify_file(&self, request: &ModifyFileRequest) -> Result<File, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::File, request.id)?;

        let columns = query::changed_columns(&[
            ("path", request.path.as_ref()),
            ("mime", request.mime.as_ref()),
            ("name", request.name.as_ref()),
            ("description", request.description.as_ref()),
        ]);
        if let Some(statement) = query::update("file", request.id, columns) {
            tx.execute(&statement.sql, params_from_iter(statement.params.iter()))
                .map_err(|e| {
                    DbError::from_write(e, || {
                        format!(
                            "file '{}' already exists",
                            request.path.as_deref().unwrap_or_default()
                        )
                    })
                })?;
        }
        if let Some(tags) = &request.tags {
            set_tags(&tx, TagOwner::File, request.id, tags)?;
        }
        tx.commit()?;
        drop(conn);

        self.get_file(request.id)
    }

    /// Delete a file together with its tag assignments and folder membership
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the file does not exist.
    pub fn delete_file(&self, id: Id) -> Result<(), DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::File, id)?;
        tx.execute("DELETE FROM file_tag WHERE file_id = ?1", [id])?;
        tx.execute("DELETE FROM folder_file WHERE file_id = ?1", [id])?;
        tx.execute("DELETE FROM file WHERE id = ?1", [id])?;
        tx.commit()?;
        debug!(id, "deleted file");
        Ok(())
    }
}
