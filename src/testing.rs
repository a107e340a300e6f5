//! Testing utilities for filetag
//!
//! This module provides helper types and functions for writing tests,
//! including a `TestDb` wrapper for temporary database management and
//! fixture builders for tags, files and folders.
//!
//! Only available when compiled with `cfg(test)`.

use crate::db::{
    AddFileToFolderRequest, CreateFileRequest, CreateFolderRequest, CreateTagRequest, Database,
    File, Folder, Id,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Wrapper for a temporary test database that cleans up on drop
///
/// The database lives in its own temporary directory, so parallel tests never
/// share state. The directory is removed when the wrapper goes out of scope.
pub struct TestDb {
    dir: TempDir,
    db: Database,
}

impl TestDb {
    /// Create a fresh, empty database
    ///
    /// # Panics
    /// Panics if the temporary directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create test directory");
        let db = Database::open(dir.path().join("filetag.db"))
            .expect("Failed to open test database");
        Self { dir, db }
    }

    /// Get a reference to the underlying database
    #[must_use]
    pub const fn db(&self) -> &Database {
        &self.db
    }

    /// Get the temporary directory holding the database
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a tag and return its id
    ///
    /// # Panics
    /// Panics if the tag cannot be created.
    pub fn tag(&self, name: &str) -> Id {
        self.db
            .create_tag(&CreateTagRequest::new(name))
            .expect("Failed to create test tag")
            .id
    }

    /// Create a file carrying `tags`
    ///
    /// # Panics
    /// Panics if the file cannot be created.
    pub fn tagged_file(&self, path: &str, tags: &[Id]) -> File {
        self.db
            .create_file(&CreateFileRequest {
                tags: tags.to_vec(),
                ..CreateFileRequest::new(path)
            })
            .expect("Failed to create test file row")
    }

    /// Create a folder containing `files`
    ///
    /// # Panics
    /// Panics if the folder cannot be created or a file cannot be linked.
    pub fn folder_with(&self, path: &str, tags: &[Id], files: &[Id]) -> Folder {
        let folder = self
            .db
            .create_folder(&CreateFolderRequest {
                tags: tags.to_vec(),
                ..CreateFolderRequest::new(path)
            })
            .expect("Failed to create test folder");
        for file_id in files {
            self.db
                .add_file_to_folder(&AddFileToFolderRequest {
                    folder_id: folder.id,
                    file_id: *file_id,
                })
                .expect("Failed to link test file");
        }
        self.db
            .get_folder(folder.id)
            .expect("Failed to reload test folder")
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a file with default content, creating parent directories
///
/// # Errors
/// Returns an `io::Error` if the file cannot be created or written.
pub fn create_test_file(path: impl AsRef<Path>) -> std::io::Result<()> {
    create_test_file_with_content(path, b"test content")
}

/// Create a file with custom content, creating parent directories
///
/// # Errors
/// Returns an `io::Error` if the file cannot be created or written.
pub fn create_test_file_with_content(
    path: impl AsRef<Path>,
    content: &[u8],
) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_basic() {
        let test_db = TestDb::new();
        let tag = test_db.tag("basic");
        let file = test_db.tagged_file("/basic.txt", &[tag]);

        assert_eq!(file.tags, vec![tag]);
        assert_eq!(test_db.db().count_files().unwrap(), 1);
    }

    #[test]
    fn test_db_cleanup() {
        let dir = {
            let test_db = TestDb::new();
            test_db.tag("x");
            test_db.path().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[test]
    fn test_folder_with_links_files() {
        let test_db = TestDb::new();
        let file = test_db.tagged_file("/d/f", &[]);
        let folder = test_db.folder_with("/d", &[], &[file.id]);
        assert_eq!(folder.files, vec![file.id]);
    }

    #[test]
    fn test_create_test_file_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.txt");
        create_test_file(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"test content");
    }
}
