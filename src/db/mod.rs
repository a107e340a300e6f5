//! Database wrapper module for filetag
//!
//! Provides a clean API for storing and retrieving files, folders and tags
//! using SQLite as the embedded database backend.
//!
//! Tables:
//! - `file`, `folder`, `tag`: one row per entity
//! - `file_tag`, `folder_tag`: tag assignments
//! - `folder_folder`: parent/child folder containment
//! - `folder_file`: folder/file containment
//!
//! The [`Database`] handle only remembers where the database lives. Every
//! operation opens its own connection and drops it before returning, on the
//! success path and the error path alike; nothing is cached between calls.

use rusqlite::{Connection, Row, params_from_iter};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod error;
pub mod file;
pub mod folder;
pub mod query;
pub mod schema;
pub mod tag;
pub mod types;

pub use error::{DbError, Entity};
pub use query::{FileQuery, FolderQuery, ListOptions, Sort, Statement, TagQuery};
pub use tag::TagOwner;
pub use types::{
    AddFileToFolderRequest, AddSubfolderRequest, AutoComplete, CreateFileRequest,
    CreateFolderRequest, CreateTagRequest, File, Folder, Id, ModifyFileRequest,
    ModifyFolderRequest, ModifyTagRequest, Tag,
};

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle that encapsulates all database operations
///
/// Cloning is cheap; clones refer to the same database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// Creates missing parent directories and the schema (idempotently).
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Examples
    /// ```no_run
    /// use filetag::db::Database;
    /// let db = Database::open("local.db").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the directory cannot be created, the database cannot
    /// be opened, or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| DbError::PathError(format!("{}: {e}", parent.display())))?;
        }

        let db = Self { path };
        let conn = db.connect()?;
        schema::create_schema(&conn)?;
        debug!(path = %db.path.display(), "database ready");
        Ok(db)
    }

    /// Path of the database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a scoped connection with foreign keys enforced
    pub(crate) fn connect(&self) -> Result<Connection, DbError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Run rendered statements in order on one connection and concatenate
    /// the parsed rows
    ///
    /// No statements is an empty result and never reaches the store.
    pub(crate) fn fetch_all<T>(
        &self,
        statements: Vec<Statement>,
        parse: impl Fn(&Row<'_>) -> Result<T, DbError>,
    ) -> Result<Vec<T>, DbError> {
        if statements.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        let mut rows = Vec::new();
        for statement in &statements {
            rows.extend(query_rows(&conn, statement, &parse)?);
        }
        Ok(rows)
    }

    /// Run a rendered query that must match exactly one row
    pub(crate) fn fetch_one<T>(
        &self,
        entity: Entity,
        key: &impl Display,
        statements: Vec<Statement>,
        parse: impl Fn(&Row<'_>) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut rows = self.fetch_all(statements, parse)?;
        match rows.len() {
            0 => Err(DbError::not_found(entity, key)),
            1 => Ok(rows.remove(0)),
            count => Err(DbError::MultipleResults {
                entity,
                key: key.to_string(),
                count,
            }),
        }
    }

    /// Number of file rows
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn count_files(&self) -> Result<usize, DbError> {
        self.count(Entity::File)
    }

    /// Number of folder rows
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn count_folders(&self) -> Result<usize, DbError> {
        self.count(Entity::Folder)
    }

    /// Number of tag rows
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn count_tags(&self) -> Result<usize, DbError> {
        self.count(Entity::Tag)
    }

    fn count(&self, entity: Entity) -> Result<usize, DbError> {
        let conn = self.connect()?;
        let sql = format!("SELECT COUNT(*) FROM {}", entity.table());
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

pub(crate) fn query_rows<T>(
    conn: &Connection,
    statement: &Statement,
    parse: impl Fn(&Row<'_>) -> Result<T, DbError>,
) -> Result<Vec<T>, DbError> {
    debug!(sql = %statement.sql, params = statement.params.len(), "query");
    let mut stmt = conn.prepare(&statement.sql)?;
    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        results.push(parse(row)?);
    }
    Ok(results)
}

/// Fail with `NotFound` unless a row with `id` exists
pub(crate) fn require_exists(conn: &Connection, entity: Entity, id: Id) -> Result<(), DbError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", entity.table());
    let exists: bool = conn.query_row(&sql, [id], |row| row.get(0))?;
    if exists {
        Ok(())
    } else {
        Err(DbError::not_found(entity, format!("id {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestDb;

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("index.db");

        let db = Database::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(db.path(), path.as_path());
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        let db = Database::open(&path).unwrap();
        db.create_file(&CreateFileRequest::new("/a.txt")).unwrap();
        drop(db);

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count_files().unwrap(), 1);
    }

    #[test]
    fn test_empty_database_counts() {
        let test_db = TestDb::new();
        let db = test_db.db();

        assert_eq!(db.count_files().unwrap(), 0);
        assert_eq!(db.count_folders().unwrap(), 0);
        assert_eq!(db.count_tags().unwrap(), 0);
    }

    #[test]
    fn test_fetch_all_without_statements_is_empty() {
        let test_db = TestDb::new();
        let rows = test_db
            .db()
            .fetch_all(Vec::new(), |row| Ok(row.get::<_, i64>(0)?))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_require_exists() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let tag = db.create_tag(&CreateTagRequest::new("x")).unwrap();

        let conn = db.connect().unwrap();
        assert!(require_exists(&conn, Entity::Tag, tag.id).is_ok());
        assert!(matches!(
            require_exists(&conn, Entity::Tag, tag.id + 100),
            Err(DbError::NotFound { entity: Entity::Tag, .. })
        ));
    }
}
