//! Tag lookups, tag writes, and tag assignment for files and folders

use super::query::{self, ListOptions, TagQuery};
use super::{Database, DbError, Entity, require_exists};
use super::types::{AutoComplete, CreateTagRequest, Id, ModifyTagRequest, Tag};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::BTreeSet;
use tracing::debug;

/// Escape character used in `LIKE` patterns
const LIKE_ESCAPE: char = '/';

/// Which association table a tag assignment lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOwner {
    File,
    Folder,
}

impl TagOwner {
    const fn entity(self) -> Entity {
        match self {
            Self::File => Entity::File,
            Self::Folder => Entity::Folder,
        }
    }

    const fn table(self) -> &'static str {
        match self {
            Self::File => "file_tag",
            Self::Folder => "folder_tag",
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::File => "file_id",
            Self::Folder => "folder_id",
        }
    }
}

/// Replace the tag set of one file or folder with exactly `tags`
///
/// Adds missing assignments, then removes stale ones. Does not commit; callers
/// run it inside their own transaction.
pub(crate) fn set_tags(
    conn: &Connection,
    owner: TagOwner,
    owner_id: Id,
    tags: &[Id],
) -> Result<(), DbError> {
    let wanted: BTreeSet<Id> = tags.iter().copied().collect();
    for tag_id in &wanted {
        require_exists(conn, Entity::Tag, *tag_id)?;
    }
    let current = assigned_tags(conn, owner, owner_id)?;

    let insert = format!(
        "INSERT INTO {}({}, tag_id) VALUES (?1, ?2)",
        owner.table(),
        owner.column()
    );
    for tag_id in wanted.difference(&current) {
        conn.execute(&insert, params![owner_id, tag_id])?;
    }

    let delete = format!(
        "DELETE FROM {} WHERE {} = ?1 AND tag_id = ?2",
        owner.table(),
        owner.column()
    );
    for tag_id in current.difference(&wanted) {
        conn.execute(&delete, params![owner_id, tag_id])?;
    }
    Ok(())
}

fn assigned_tags(
    conn: &Connection,
    owner: TagOwner,
    owner_id: Id,
) -> Result<BTreeSet<Id>, DbError> {
    let sql = format!(
        "SELECT tag_id FROM {} WHERE {} = ?1",
        owner.table(),
        owner.column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map([owner_id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(ids)
}

fn tag_id_by_name(conn: &Connection, name: &str) -> Result<Option<Id>, DbError> {
    Ok(conn
        .query_row("SELECT id FROM tag WHERE name = ?1", [name], |row| row.get(0))
        .optional()?)
}

/// Escape `%`, `_` and the escape character itself for a `LIKE` pattern
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    /// Get a single tag by id
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no tag has this id and
    /// `DbError::MultipleResults` if the id is not unique.
    pub fn get_tag(&self, id: Id) -> Result<Tag, DbError> {
        let query = TagQuery::ById(id);
        self.fetch_one(Entity::Tag, &query, query.statements(), Tag::from_row)
    }

    /// Get the tags whose ids appear in `ids`; unknown ids are skipped
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_tags(&self, ids: &[Id]) -> Result<Vec<Tag>, DbError> {
        self.fetch_all(TagQuery::ByIds(ids.to_vec()).statements(), Tag::from_row)
    }

    /// Get a tag by its exact name
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no tag has this name.
    pub fn get_tag_by_name(&self, name: &str) -> Result<Tag, DbError> {
        let query = TagQuery::ByName(name.to_string());
        self.fetch_one(Entity::Tag, &query, query.statements(), Tag::from_row)
    }

    /// Get every tag ordered by id
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn get_all_tags(&self) -> Result<Vec<Tag>, DbError> {
        self.fetch_all(TagQuery::All.statements(), Tag::from_row)
    }

    /// List tags in the given order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for an unknown sort column.
    pub fn list_tags(&self, options: &ListOptions) -> Result<Vec<Tag>, DbError> {
        self.fetch_all(vec![TagQuery::All.listed(options)?], Tag::from_row)
    }

    /// Add tags by name to a file or folder, creating unknown names
    ///
    /// Runs in one transaction: when the owner is missing no tag is created.
    /// Returns the owner's new tag ids in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the file or folder does not exist.
    pub fn attach_tags(
        &self,
        owner: TagOwner,
        owner_id: Id,
        names: &[String],
    ) -> Result<Vec<Id>, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, owner.entity(), owner_id)?;

        let mut tags = assigned_tags(&tx, owner, owner_id)?;
        for name in names {
            let tag_id = match tag_id_by_name(&tx, name)? {
                Some(tag_id) => tag_id,
                None => {
                    tx.execute("INSERT INTO tag(name) VALUES (?1)", [name])
                        .map_err(|e| {
                            DbError::from_write(e, || format!("tag '{name}' already exists"))
                        })?;
                    debug!(name = %name, "created tag");
                    tx.last_insert_rowid()
                }
            };
            tags.insert(tag_id);
        }

        let tags: Vec<Id> = tags.into_iter().collect();
        set_tags(&tx, owner, owner_id, &tags)?;
        tx.commit()?;
        debug!(?owner, owner_id, count = tags.len(), "attached tags");
        Ok(tags)
    }

    /// Remove tags by name from a file or folder in one transaction
    ///
    /// Returns the owner's remaining tag ids in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the owner or one of the names does not
    /// exist; nothing is removed then.
    pub fn detach_tags(
        &self,
        owner: TagOwner,
        owner_id: Id,
        names: &[String],
    ) -> Result<Vec<Id>, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, owner.entity(), owner_id)?;

        let mut tags = assigned_tags(&tx, owner, owner_id)?;
        for name in names {
            let tag_id = tag_id_by_name(&tx, name)?
                .ok_or_else(|| DbError::not_found(Entity::Tag, format!("name '{name}'")))?;
            tags.remove(&tag_id);
        }

        let tags: Vec<Id> = tags.into_iter().collect();
        set_tags(&tx, owner, owner_id, &tags)?;
        tx.commit()?;
        debug!(?owner, owner_id, count = tags.len(), "detached tags");
        Ok(tags)
    }

    /// Create a tag
    ///
    /// # Errors
    ///
    /// Returns `DbError::Conflict` if a tag with the same name exists.
    pub fn create_tag(&self, request: &CreateTagRequest) -> Result<Tag, DbError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tag(name, description) VALUES (?1, ?2)",
            params![request.name, request.description],
        )
        .map_err(|e| {
            DbError::from_write(e, || format!("a tag named '{}' already exists", request.name))
        })?;
        let id = conn.last_insert_rowid();
        debug!(id, name = %request.name, "created tag");
        drop(conn);
        self.get_tag(id)
    }

    /// Rename a tag or change its description
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the tag does not exist and
    /// `DbError::Conflict` if the new name is taken.
    pub fn modify_tag(&self, request: &ModifyTagRequest) -> Result<Tag, DbError> {
        let conn = self.connect()?;
        require_exists(&conn, Entity::Tag, request.id)?;

        let columns = query::changed_columns(&[
            ("name", request.name.as_ref()),
            ("description", request.description.as_ref()),
        ]);
        if let Some(statement) = query::update("tag", request.id, columns) {
            conn.execute(&statement.sql, params_from_iter(statement.params.iter()))
                .map_err(|e| {
                    DbError::from_write(e, || {
                        format!(
                            "a tag named '{}' already exists",
                            request.name.as_deref().unwrap_or_default()
                        )
                    })
                })?;
        }
        drop(conn);
        self.get_tag(request.id)
    }

    /// Delete a tag together with every file and folder assignment of it
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the tag does not exist.
    pub fn delete_tag(&self, id: Id) -> Result<(), DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        require_exists(&tx, Entity::Tag, id)?;
        tx.execute("DELETE FROM file_tag WHERE tag_id = ?1", [id])?;
        tx.execute("DELETE FROM folder_tag WHERE tag_id = ?1", [id])?;
        tx.execute("DELETE FROM tag WHERE id = ?1", [id])?;
        tx.commit()?;
        debug!(id, "deleted tag");
        Ok(())
    }

    /// Suggest tags whose name contains `fragment` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database cannot be queried.
    pub fn autocomplete_tags(&self, fragment: &str) -> Result<Vec<AutoComplete>, DbError> {
        let conn = self.connect()?;
        let pattern = format!("%{}%", escape_like(fragment));
        let mut stmt =
            conn.prepare("SELECT name FROM tag WHERE name LIKE ?1 ESCAPE ?2 ORDER BY name")?;
        let names = stmt
            .query_map(params![pattern, LIKE_ESCAPE.to_string()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(names
            .into_iter()
            .map(|name| AutoComplete {
                value: name.replace(' ', "_"),
                label: name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Sort;
    use crate::db::types::{CreateFileRequest, CreateFolderRequest, ModifyFileRequest};
    use crate::testing::TestDb;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off/"), "50/%/_off//");
    }

    #[test]
    fn test_create_and_get_tag() {
        let test_db = TestDb::new();
        let db = test_db.db();

        let created = db
            .create_tag(&CreateTagRequest {
                name: "holiday".into(),
                description: Some("trips".into()),
            })
            .unwrap();
        let fetched = db.get_tag(created.id).unwrap();

        assert_eq!(fetched.name, "holiday");
        assert_eq!(fetched.description.as_deref(), Some("trips"));
        assert_eq!(fetched.count, 0);
    }

    #[test]
    fn test_get_missing_tag_is_not_found() {
        let test_db = TestDb::new();
        let err = test_db.db().get_tag(404).unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: Entity::Tag, .. }));
    }

    #[test]
    fn test_duplicate_tag_name_conflicts() {
        let test_db = TestDb::new();
        let db = test_db.db();
        db.create_tag(&CreateTagRequest::new("dup")).unwrap();

        let err = db.create_tag(&CreateTagRequest::new("dup")).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(db.count_tags().unwrap(), 1);
    }

    #[test]
    fn test_get_tags_by_id_set() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let a = db.create_tag(&CreateTagRequest::new("a")).unwrap();
        let b = db.create_tag(&CreateTagRequest::new("b")).unwrap();
        db.create_tag(&CreateTagRequest::new("c")).unwrap();

        let tags = db.get_tags(&[b.id, a.id, b.id, 999]).unwrap();
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["a", "b"]);
        assert!(db.get_tags(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_tag_count_spans_files_and_folders() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let shared = db.create_tag(&CreateTagRequest::new("shared")).unwrap();
        let lonely = db.create_tag(&CreateTagRequest::new("lonely")).unwrap();

        for path in ["/a", "/b"] {
            db.create_file(&CreateFileRequest {
                tags: vec![shared.id],
                ..CreateFileRequest::new(path)
            })
            .unwrap();
        }
        db.create_folder(&CreateFolderRequest {
            tags: vec![shared.id, lonely.id],
            ..CreateFolderRequest::new("/dir")
        })
        .unwrap();

        assert_eq!(db.get_tag(shared.id).unwrap().count, 3);
        assert_eq!(db.get_tag(lonely.id).unwrap().count, 1);

        let options = ListOptions {
            sort: Sort::parse_list("-count,name").unwrap(),
            ..ListOptions::default()
        };
        let names: Vec<String> = db
            .list_tags(&options)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["shared", "lonely"]);
    }

    #[test]
    fn test_modify_tag_renames() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let tag = db.create_tag(&CreateTagRequest::new("old")).unwrap();

        let modified = db
            .modify_tag(&ModifyTagRequest {
                id: tag.id,
                name: Some("new".into()),
                description: None,
            })
            .unwrap();

        assert_eq!(modified.name, "new");
        assert_eq!(db.get_tag_by_name("new").unwrap().id, tag.id);
    }

    #[test]
    fn test_modify_tag_to_taken_name_conflicts() {
        let test_db = TestDb::new();
        let db = test_db.db();
        db.create_tag(&CreateTagRequest::new("taken")).unwrap();
        let tag = db.create_tag(&CreateTagRequest::new("free")).unwrap();

        let err = db
            .modify_tag(&ModifyTagRequest {
                id: tag.id,
                name: Some("taken".into()),
                description: None,
            })
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_delete_tag_removes_assignments() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let tag = db.create_tag(&CreateTagRequest::new("gone")).unwrap();
        let file = db
            .create_file(&CreateFileRequest {
                tags: vec![tag.id],
                ..CreateFileRequest::new("/f")
            })
            .unwrap();
        let folder = db
            .create_folder(&CreateFolderRequest {
                tags: vec![tag.id],
                ..CreateFolderRequest::new("/d")
            })
            .unwrap();

        db.delete_tag(tag.id).unwrap();

        assert!(db.get_file(file.id).unwrap().tags.is_empty());
        assert!(db.get_folder(folder.id).unwrap().tags.is_empty());
        assert!(matches!(db.get_tag(tag.id), Err(DbError::NotFound { .. })));
    }

    #[test]
    fn test_delete_missing_tag_is_not_found() {
        let test_db = TestDb::new();
        assert!(matches!(
            test_db.db().delete_tag(1),
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_tags_replaces_exactly() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let a = db.create_tag(&CreateTagRequest::new("a")).unwrap();
        let b = db.create_tag(&CreateTagRequest::new("b")).unwrap();
        let c = db.create_tag(&CreateTagRequest::new("c")).unwrap();
        let file = db
            .create_file(&CreateFileRequest {
                tags: vec![a.id, b.id],
                ..CreateFileRequest::new("/f")
            })
            .unwrap();

        let modified = db
            .modify_file(&ModifyFileRequest {
                id: file.id,
                tags: Some(vec![b.id, c.id]),
                ..ModifyFileRequest::default()
            })
            .unwrap();

        assert_eq!(modified.tags, vec![b.id, c.id]);
    }

    #[test]
    fn test_set_unknown_tag_is_not_found() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let file = db.create_file(&CreateFileRequest::new("/f")).unwrap();

        let err = db
            .modify_file(&ModifyFileRequest {
                id: file.id,
                tags: Some(vec![77]),
                ..ModifyFileRequest::default()
            })
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { entity: Entity::Tag, .. }));
        assert!(db.get_file(file.id).unwrap().tags.is_empty());
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_attach_tags_creates_and_assigns_together() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let beach = db.create_tag(&CreateTagRequest::new("beach")).unwrap();
        let folder = db.create_folder(&CreateFolderRequest::new("/photos")).unwrap();

        let tags = db
            .attach_tags(TagOwner::Folder, folder.id, &names(&["sunset", "beach", "sunset"]))
            .unwrap();

        let sunset = db.get_tag_by_name("sunset").unwrap();
        assert_eq!(tags, vec![beach.id, sunset.id]);
        assert_eq!(db.get_folder(folder.id).unwrap().tags, tags);
        assert_eq!(sunset.count, 1);
    }

    #[test]
    fn test_attach_tags_to_missing_owner_creates_nothing() {
        let test_db = TestDb::new();
        let db = test_db.db();

        let err = db
            .attach_tags(TagOwner::File, 404, &names(&["fresh"]))
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { entity: Entity::File, .. }));
        assert_eq!(db.count_tags().unwrap(), 0);
    }

    #[test]
    fn test_detach_tags_with_unknown_name_changes_nothing() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let keep = db.create_tag(&CreateTagRequest::new("keep")).unwrap();
        let gone = db.create_tag(&CreateTagRequest::new("drop")).unwrap();
        let file = db
            .create_file(&CreateFileRequest {
                tags: vec![keep.id, gone.id],
                ..CreateFileRequest::new("/f")
            })
            .unwrap();

        let err = db
            .detach_tags(TagOwner::File, file.id, &names(&["drop", "missing"]))
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: Entity::Tag, .. }));
        assert_eq!(db.get_file(file.id).unwrap().tags, vec![keep.id, gone.id]);

        let tags = db.detach_tags(TagOwner::File, file.id, &names(&["drop"])).unwrap();
        assert_eq!(tags, vec![keep.id]);
    }

    #[test]
    fn test_autocomplete_matches_substring_case_insensitively() {
        let test_db = TestDb::new();
        let db = test_db.db();
        for name in ["Road Trip", "trip_2020", "work"] {
            db.create_tag(&CreateTagRequest::new(name)).unwrap();
        }

        let suggestions = db.autocomplete_tags("TRIP").unwrap();

        assert_eq!(
            suggestions,
            vec![
                AutoComplete {
                    label: "Road Trip".into(),
                    value: "Road_Trip".into()
                },
                AutoComplete {
                    label: "trip_2020".into(),
                    value: "trip_2020".into()
                },
            ]
        );
    }

    #[test]
    fn test_autocomplete_escapes_wildcards() {
        let test_db = TestDb::new();
        let db = test_db.db();
        db.create_tag(&CreateTagRequest::new("100%")).unwrap();
        db.create_tag(&CreateTagRequest::new("1000")).unwrap();

        let suggestions = db.autocomplete_tags("0%").unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "100%");
    }
}
