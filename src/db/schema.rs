//! Relational schema for files, folders, tags and their associations
//!
//! Association tables declare foreign keys without `ON DELETE` actions, so
//! deletes must clear association rows explicitly before removing an entity.

use rusqlite::Connection;

const CREATE_FILE: &str = "CREATE TABLE IF NOT EXISTS file(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL,
    mime TEXT,
    name TEXT,
    description TEXT,
    CONSTRAINT file_path_unique UNIQUE (path)
)";

const CREATE_FOLDER: &str = "CREATE TABLE IF NOT EXISTS folder(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL,
    name TEXT,
    description TEXT
)";

const CREATE_TAG: &str = "CREATE TABLE IF NOT EXISTS tag(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    CONSTRAINT tag_name_unique UNIQUE (name)
)";

const CREATE_FILE_TAG: &str = "CREATE TABLE IF NOT EXISTS file_tag(
    file_id INTEGER NOT NULL REFERENCES file(id),
    tag_id INTEGER NOT NULL REFERENCES tag(id),
    PRIMARY KEY (file_id, tag_id)
)";

const CREATE_FOLDER_TAG: &str = "CREATE TABLE IF NOT EXISTS folder_tag(
    folder_id INTEGER NOT NULL REFERENCES folder(id),
    tag_id INTEGER NOT NULL REFERENCES tag(id),
    PRIMARY KEY (folder_id, tag_id)
)";

const CREATE_FOLDER_FOLDER: &str = "CREATE TABLE IF NOT EXISTS folder_folder(
    parent_id INTEGER NOT NULL REFERENCES folder(id),
    child_id INTEGER NOT NULL REFERENCES folder(id),
    PRIMARY KEY (parent_id, child_id)
)";

const CREATE_FOLDER_FILE: &str = "CREATE TABLE IF NOT EXISTS folder_file(
    folder_id INTEGER NOT NULL REFERENCES folder(id),
    file_id INTEGER NOT NULL REFERENCES file(id),
    PRIMARY KEY (folder_id, file_id)
)";

const CREATE_INDICES: &str = "
CREATE INDEX IF NOT EXISTS folder_path_index ON folder(path);
CREATE INDEX IF NOT EXISTS file_tag_tag_index ON file_tag(tag_id);
CREATE INDEX IF NOT EXISTS folder_tag_tag_index ON folder_tag(tag_id);
CREATE INDEX IF NOT EXISTS folder_folder_child_index ON folder_folder(child_id);
CREATE INDEX IF NOT EXISTS folder_file_file_index ON folder_file(file_id);
";

/// Every table statement, entities before the associations referencing them
pub const TABLES: [&str; 7] = [
    CREATE_FILE,
    CREATE_FOLDER,
    CREATE_TAG,
    CREATE_FILE_TAG,
    CREATE_FOLDER_TAG,
    CREATE_FOLDER_FOLDER,
    CREATE_FOLDER_FILE,
];

/// Create all tables and indices if they do not exist yet
///
/// # Errors
///
/// Returns the SQLite error if any statement fails.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    for statement in TABLES {
        conn.execute(statement, [])?;
    }
    conn.execute_batch(CREATE_INDICES)
}
