//! Directory ingestion
//!
//! [`Scanner`] walks scan roots and records what it finds:
//! - every directory becomes a folder (reusing one already stored at that
//!   path) linked under its parent directory's folder
//! - every file accepted by the [`ScanFilter`] becomes a file row with a
//!   guessed mimetype, linked into its directory's folder
//!
//! Files already indexed are counted as duplicates and left untouched, so
//! scanning the same tree twice is harmless. Hidden entries (leading `.`)
//! below a root are skipped.

pub mod error;
pub mod filter;

pub use error::IngestError;
pub use filter::ScanFilter;

use crate::db::{
    AddFileToFolderRequest, AddSubfolderRequest, CreateFileRequest, CreateFolderRequest,
    Database, DbError, Id,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Counts of what a scan did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// New file rows
    pub inserted: usize,
    /// Files skipped because their path was already indexed
    pub duplicates: usize,
    /// Files rejected by the scan filter
    pub rejected: usize,
    /// New folder rows
    pub folders: usize,
}

impl std::ops::AddAssign for IngestReport {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.duplicates += rhs.duplicates;
        self.rejected += rhs.rejected;
        self.folders += rhs.folders;
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Guess the mimetype of `path` from its extension
#[must_use]
pub fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Walks directories into the store
pub struct Scanner<'a> {
    db: &'a Database,
    filter: ScanFilter,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, filter: ScanFilter) -> Self {
        Self { db, filter }
    }

    /// Scan every root in turn and sum the reports
    ///
    /// # Errors
    /// Returns `IngestError::MissingRoot` for a root that does not exist and
    /// `IngestError::DatabaseError` if the store rejects a write.
    pub fn scan_roots(&self, roots: &[PathBuf]) -> Result<IngestReport, IngestError> {
        let mut total = IngestReport::default();
        for root in roots {
            total += self.scan(root)?;
        }
        Ok(total)
    }

    /// Scan one root
    ///
    /// # Errors
    /// Returns `IngestError::MissingRoot` if `root` does not exist and
    /// `IngestError::DatabaseError` if the store rejects a write.
    pub fn scan(&self, root: &Path) -> Result<IngestReport, IngestError> {
        if !root.exists() {
            return Err(IngestError::MissingRoot(root.to_path_buf()));
        }

        let mut report = IngestReport::default();
        let mut folders: HashMap<PathBuf, Id> = HashMap::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let parent = path.parent().and_then(|p| folders.get(p)).copied();

            if entry.file_type().is_dir() {
                let id = self.folder_for(path, &mut report)?;
                if let Some(parent_id) = parent {
                    self.link_folder(parent_id, id)?;
                }
                folders.insert(path.to_path_buf(), id);
            } else if self.filter.accepts(path) {
                self.ingest_file(path, parent, &mut report)?;
            } else {
                debug!(path = %path.display(), "rejected by filter");
                report.rejected += 1;
            }
        }

        info!(
            root = %root.display(),
            inserted = report.inserted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            folders = report.folders,
            "scan finished"
        );
        Ok(report)
    }

    /// Index one file and place it in `parent`
    ///
    /// The row and its folder link are written together. An already indexed
    /// path counts as a duplicate; if it is in no folder yet it is linked to
    /// `parent`, which heals a scan that stopped between the two writes.
    ///
    /// # Errors
    /// Returns `IngestError::DatabaseError` for any store error other than a
    /// duplicate path.
    pub fn ingest_file(
        &self,
        path: &Path,
        parent: Option<Id>,
        report: &mut IngestReport,
    ) -> Result<(), IngestError> {
        let request = CreateFileRequest {
            mime: guess_mime(path),
            name: file_name(path),
            folder_id: parent,
            ..CreateFileRequest::new(path_string(path))
        };

        match self.db.create_file(&request) {
            Ok(file) => {
                debug!(id = file.id, path = %path.display(), mime = ?file.mime, "indexed");
                report.inserted += 1;
                Ok(())
            }
            Err(DbError::Conflict(_)) => {
                debug!(path = %path.display(), "already indexed");
                report.duplicates += 1;
                self.relink(&request.path, parent)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Put an indexed file that lost its folder back under `parent`
    fn relink(&self, path: &str, parent: Option<Id>) -> Result<(), IngestError> {
        let Some(folder_id) = parent else {
            return Ok(());
        };
        let file = self.db.get_file_by_path(path)?;
        if file.parent_folder_id.is_none() {
            self.db.add_file_to_folder(&AddFileToFolderRequest {
                folder_id,
                file_id: file.id,
            })?;
            info!(id = file.id, path, folder_id, "relinked file");
        }
        Ok(())
    }

    fn folder_for(&self, path: &Path, report: &mut IngestReport) -> Result<Id, IngestError> {
        let key = path_string(path);
        match self.db.get_folder_by_path(&key) {
            Ok(folder) => Ok(folder.id),
            Err(DbError::NotFound { .. }) => {
                let folder = self.db.create_folder(&CreateFolderRequest {
                    name: file_name(path),
                    ..CreateFolderRequest::new(key)
                })?;
                report.folders += 1;
                Ok(folder.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Link a folder under its parent; an existing parent link is kept
    fn link_folder(&self, parent_id: Id, child_id: Id) -> Result<(), IngestError> {
        match self.db.add_subfolder(&AddSubfolderRequest {
            parent_id,
            child_id,
        }) {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() => {
                debug!(parent_id, child_id, reason = %e, "folder already linked");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestDb, create_test_file};

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["a.jpg", "b.txt", "sub/c.png", "sub/deep/d.mp3", ".hidden/e.jpg"] {
            create_test_file(dir.path().join(rel)).unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_indexes_files_and_folders() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let dir = tree();

        let report = Scanner::new(db, ScanFilter::accept_all())
            .scan(dir.path())
            .unwrap();

        assert_eq!(report.inserted, 4);
        assert_eq!(report.folders, 3);
        assert_eq!(report.duplicates, 0);
        assert_eq!(db.count_files().unwrap(), 4);

        let roots = db.get_root_folders().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, path_string(dir.path()));
        assert!(db.get_orphaned_files().unwrap().is_empty());
    }

    #[test]
    fn test_scan_links_structure() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let dir = tree();
        Scanner::new(db, ScanFilter::accept_all())
            .scan(dir.path())
            .unwrap();

        let sub = db
            .get_folder_by_path(&path_string(&dir.path().join("sub")))
            .unwrap();
        let png = db
            .get_file_by_path(&path_string(&dir.path().join("sub/c.png")))
            .unwrap();

        assert_eq!(sub.name.as_deref(), Some("sub"));
        assert_eq!(sub.files, vec![png.id]);
        assert_eq!(sub.folders.len(), 1);
        assert_eq!(png.parent_folder_id, Some(sub.id));
        assert_eq!(png.mime.as_deref(), Some("image/png"));
        assert_eq!(png.name.as_deref(), Some("c.png"));
    }

    #[test]
    fn test_rescan_counts_duplicates() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let dir = tree();
        let scanner = Scanner::new(db, ScanFilter::accept_all());
        scanner.scan(dir.path()).unwrap();

        let again = scanner.scan(dir.path()).unwrap();

        assert_eq!(again.inserted, 0);
        assert_eq!(again.duplicates, 4);
        assert_eq!(again.folders, 0);
        assert_eq!(db.count_files().unwrap(), 4);
        assert_eq!(db.count_folders().unwrap(), 3);
    }

    #[test]
    fn test_rescan_links_file_left_without_folder() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("a.jpg");
        create_test_file(&jpg).unwrap();
        // indexed earlier without its folder link
        let loose = db.create_file(&CreateFileRequest::new(path_string(&jpg))).unwrap();

        let report = Scanner::new(db, ScanFilter::accept_all())
            .scan(dir.path())
            .unwrap();

        let root = db.get_folder_by_path(&path_string(dir.path())).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(db.get_file(loose.id).unwrap().parent_folder_id, Some(root.id));
        assert!(db.get_orphaned_files().unwrap().is_empty());
    }

    #[test]
    fn test_filter_rejections_are_counted() {
        let test_db = TestDb::new();
        let dir = tree();
        let filter = ScanFilter::new(&["jpg".to_string(), "png".to_string()], &[]).unwrap();

        let report = Scanner::new(test_db.db(), filter).scan(dir.path()).unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.rejected, 2);
    }

    #[test]
    fn test_missing_root() {
        let test_db = TestDb::new();
        let missing = test_db.path().join("nope");
        let err = Scanner::new(test_db.db(), ScanFilter::accept_all())
            .scan(&missing)
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingRoot(_)));
    }

    #[test]
    fn test_scan_roots_sums_reports() {
        let test_db = TestDb::new();
        let (one, two) = (tree(), tree());

        let report = Scanner::new(test_db.db(), ScanFilter::accept_all())
            .scan_roots(&[one.path().to_path_buf(), two.path().to_path_buf()])
            .unwrap();

        assert_eq!(report.inserted, 8);
        assert_eq!(report.folders, 6);
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("x.pdf")).as_deref(), Some("application/pdf"));
        assert_eq!(guess_mime(Path::new("x")), None);
    }
}
