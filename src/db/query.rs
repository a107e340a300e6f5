//! Typed query objects over the entity store
//!
//! Each entity has one select that hydrates the row with its aggregated
//! association lists in a single round trip (`LEFT JOIN` + `GROUP BY` +
//! `GROUP_CONCAT(DISTINCT ..)`). The query enums below wrap that select with a
//! constraint and render it, together with its bound parameters, as a
//! [`Statement`].
//!
//! Rendering returns no statement for an empty id set, so an `IN ()`
//! predicate is never issued. Id sets larger than [`MAX_BOUND_IDS`] render as
//! several statements over ascending id ranges; running them in order and
//! concatenating the rows keeps the result ordered by id.
//!
//! List queries (`All`, `Orphaned`, `Root`) can also be rendered with
//! [`ListOptions`]: sort keys checked against the entity's sortable columns,
//! then `LIMIT`/`OFFSET` bound as parameters.

use super::error::{DbError, Entity};
use super::types::Id;
use rusqlite::types::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Most ids bound into a single `IN (...)` list
///
/// SQLite caps host parameters per statement (32766 since 3.32), so larger
/// sets are split.
pub const MAX_BOUND_IDS: usize = 10_000;

/// File rows with their tag ids and owning folder
pub const FILE_SELECT: &str = "SELECT file.id, file.path, file.mime, file.name, file.description, \
GROUP_CONCAT(DISTINCT file_tag.tag_id) AS tags, \
MIN(folder_file.folder_id) AS parent_folder_id \
FROM file \
LEFT JOIN file_tag ON file_tag.file_id = file.id \
LEFT JOIN folder_file ON folder_file.file_id = file.id \
GROUP BY file.id";

/// Folder rows with their tag ids, child folder ids and file ids
pub const FOLDER_SELECT: &str = "SELECT folder.id, folder.path, folder.name, folder.description, \
GROUP_CONCAT(DISTINCT folder_tag.tag_id) AS tags, \
GROUP_CONCAT(DISTINCT folder_folder.child_id) AS folders, \
GROUP_CONCAT(DISTINCT folder_file.file_id) AS files \
FROM folder \
LEFT JOIN folder_tag ON folder_tag.folder_id = folder.id \
LEFT JOIN folder_folder ON folder_folder.parent_id = folder.id \
LEFT JOIN folder_file ON folder_file.folder_id = folder.id \
GROUP BY folder.id";

/// Tag rows with the number of distinct files and folders referencing them
pub const TAG_SELECT: &str = "SELECT tag.id, tag.name, tag.description, \
(SELECT COUNT(DISTINCT file_tag.file_id) FROM file_tag WHERE file_tag.tag_id = tag.id) \
+ (SELECT COUNT(DISTINCT folder_tag.folder_id) FROM folder_tag \
WHERE folder_tag.tag_id = tag.id) AS count \
FROM tag";

const ORPHANED_FILES: &str = "id NOT IN (SELECT DISTINCT file_id FROM folder_file)";
const ROOT_FOLDERS: &str = "id NOT IN (SELECT DISTINCT child_id FROM folder_folder)";

/// Columns a file listing may be sorted by
pub const FILE_COLUMNS: &[&str] = &["id", "path", "mime", "name", "description"];
/// Columns a folder listing may be sorted by
pub const FOLDER_COLUMNS: &[&str] = &["id", "path", "name", "description"];
/// Columns a tag listing may be sorted by
pub const TAG_COLUMNS: &[&str] = &["id", "name", "description", "count"];

/// One sort key: a column name and a direction
///
/// Written as `name` or `+name` for ascending and `-name` for descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub ascending: bool,
}

impl Sort {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Parse a comma separated list such as `-count,name`
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for an empty key.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, DbError> {
        text.split(',').map(str::parse::<Self>).collect()
    }

    /// The whitelisted column this key names, never the raw input
    fn resolve(&self, entity: Entity, columns: &[&'static str]) -> Result<&'static str, DbError> {
        columns
            .iter()
            .copied()
            .find(|column| *column == self.column)
            .ok_or_else(|| {
                DbError::InvalidSort(format!(
                    "cannot sort {entity} by '{}'; expected one of {}",
                    self.column,
                    columns.join(", ")
                ))
            })
    }
}

impl FromStr for Sort {
    type Err = DbError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        let sort = match key.strip_prefix('-') {
            Some(column) => Self::desc(column.trim()),
            None => Self::asc(key.strip_prefix('+').unwrap_or(key).trim()),
        };
        if sort.column.is_empty() {
            return Err(DbError::InvalidSort(format!("empty sort key in '{key}'")));
        }
        Ok(sort)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ascending {
            f.write_str(&self.column)
        } else {
            write!(f, "-{}", self.column)
        }
    }
}

/// Order and page of a list query
///
/// Rows are ordered by the sort keys, then by id. No limit returns every row
/// after `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: Vec<Sort>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListOptions {
    fn order_by(&self, entity: Entity, columns: &[&'static str]) -> Result<String, DbError> {
        let mut keys = Vec::with_capacity(self.sort.len() + 1);
        for sort in &self.sort {
            let column = sort.resolve(entity, columns)?;
            keys.push(format!("{column} {}", if sort.ascending { "ASC" } else { "DESC" }));
        }
        if !self.sort.iter().any(|sort| sort.column == "id") {
            keys.push("id ASC".to_string());
        }
        Ok(keys.join(", "))
    }

    fn page_params(&self) -> Vec<Value> {
        // LIMIT -1 is SQLite for "no limit"
        let limit = self
            .limit
            .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let offset = i64::try_from(self.offset).unwrap_or(i64::MAX);
        vec![Value::Integer(limit), Value::Integer(offset)]
    }
}

/// A rendered SQL statement and its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn filtered(select: &str, predicate: &str, params: Vec<Value>) -> Self {
        Self {
            sql: format!("SELECT * FROM ({select}) WHERE {predicate} ORDER BY id"),
            params,
        }
    }

    fn unfiltered(select: &str) -> Self {
        Self {
            sql: format!("SELECT * FROM ({select}) ORDER BY id"),
            params: Vec::new(),
        }
    }

    /// One statement per chunk of the sorted, de-duplicated id set
    fn by_ids(select: &str, ids: &[Id]) -> Vec<Self> {
        let unique: Vec<Id> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        unique
            .chunks(MAX_BOUND_IDS)
            .map(|chunk| {
                let predicate = format!("id IN ({})", placeholders(chunk.len()));
                let params = chunk.iter().copied().map(Value::Integer).collect();
                Self::filtered(select, &predicate, params)
            })
            .collect()
    }

    fn listed(
        select: &str,
        predicate: Option<&str>,
        (entity, columns): (Entity, &[&'static str]),
        options: &ListOptions,
    ) -> Result<Self, DbError> {
        let filter = predicate.map_or_else(String::new, |p| format!(" WHERE {p}"));
        let order = options.order_by(entity, columns)?;
        Ok(Self {
            sql: format!("SELECT * FROM ({select}){filter} ORDER BY {order} LIMIT ? OFFSET ?"),
            params: options.page_params(),
        })
    }
}

fn not_listable(query: &impl fmt::Display) -> DbError {
    DbError::Unsupported(format!("lookup by {query} cannot be sorted or paged"))
}

/// Render `UPDATE table SET a = ?, b = ? WHERE id = ?` for the given columns
///
/// Returns `None` when there is nothing to update.
#[must_use]
pub fn update(table: &str, id: Id, columns: Vec<(&'static str, Value)>) -> Option<Statement> {
    if columns.is_empty() {
        return None;
    }
    let assignments: Vec<String> = columns
        .iter()
        .map(|(column, _)| format!("{column} = ?"))
        .collect();
    let mut params: Vec<Value> = columns.into_iter().map(|(_, value)| value).collect();
    params.push(Value::Integer(id));
    Some(Statement {
        sql: format!("UPDATE {table} SET {} WHERE id = ?", assignments.join(", ")),
        params,
    })
}

/// Collect the `Some` fields of a partial update as column/value pairs
#[must_use]
pub fn changed_columns(fields: &[(&'static str, Option<&String>)]) -> Vec<(&'static str, Value)> {
    fields
        .iter()
        .filter_map(|(column, value)| value.map(|v| (*column, Value::Text(v.clone()))))
        .collect()
}

/// Build `?, ?, ?` for `count` parameters
#[must_use]
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Constrained lookups over files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileQuery {
    ById(Id),
    ByIds(Vec<Id>),
    ByPath(String),
    /// Files absent from the folder-file association
    Orphaned,
    All,
}

impl FileQuery {
    /// Render the query; no statements means the result is empty without
    /// asking the store
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        match self {
            Self::ById(id) => vec![Statement::filtered(
                FILE_SELECT,
                "id = ?",
                vec![Value::Integer(*id)],
            )],
            Self::ByIds(ids) => Statement::by_ids(FILE_SELECT, ids),
            Self::ByPath(path) => vec![Statement::filtered(
                FILE_SELECT,
                "path = ?",
                vec![Value::Text(path.clone())],
            )],
            Self::Orphaned => vec![Statement::filtered(FILE_SELECT, ORPHANED_FILES, Vec::new())],
            Self::All => vec![Statement::unfiltered(FILE_SELECT)],
        }
    }

    /// Render a list query in the requested order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for a column outside [`FILE_COLUMNS`]
    /// and `DbError::Unsupported` for a lookup by id or path.
    pub fn listed(&self, options: &ListOptions) -> Result<Statement, DbError> {
        let predicate = match self {
            Self::Orphaned => Some(ORPHANED_FILES),
            Self::All => None,
            _ => return Err(not_listable(self)),
        };
        Statement::listed(FILE_SELECT, predicate, (Entity::File, FILE_COLUMNS), options)
    }
}

impl fmt::Display for FileQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::ById(id) => QueryKey::Id(*id),
            Self::ByIds(ids) => QueryKey::Ids(ids),
            Self::ByPath(path) => QueryKey::Text("path", path),
            Self::Orphaned => QueryKey::Label("orphaned files"),
            Self::All => QueryKey::Label("all files"),
        };
        describe(f, key)
    }
}

/// Constrained lookups over folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderQuery {
    ById(Id),
    ByIds(Vec<Id>),
    ByPath(String),
    /// Folders absent from the child side of the folder-folder association
    Root,
    All,
}

impl FolderQuery {
    /// Render the query; no statements means the result is empty without
    /// asking the store
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        match self {
            Self::ById(id) => vec![Statement::filtered(
                FOLDER_SELECT,
                "id = ?",
                vec![Value::Integer(*id)],
            )],
            Self::ByIds(ids) => Statement::by_ids(FOLDER_SELECT, ids),
            Self::ByPath(path) => vec![Statement::filtered(
                FOLDER_SELECT,
                "path = ?",
                vec![Value::Text(path.clone())],
            )],
            Self::Root => vec![Statement::filtered(FOLDER_SELECT, ROOT_FOLDERS, Vec::new())],
            Self::All => vec![Statement::unfiltered(FOLDER_SELECT)],
        }
    }

    /// Render a list query in the requested order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for a column outside [`FOLDER_COLUMNS`]
    /// and `DbError::Unsupported` for a lookup by id or path.
    pub fn listed(&self, options: &ListOptions) -> Result<Statement, DbError> {
        let predicate = match self {
            Self::Root => Some(ROOT_FOLDERS),
            Self::All => None,
            _ => return Err(not_listable(self)),
        };
        Statement::listed(FOLDER_SELECT, predicate, (Entity::Folder, FOLDER_COLUMNS), options)
    }
}

impl fmt::Display for FolderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::ById(id) => QueryKey::Id(*id),
            Self::ByIds(ids) => QueryKey::Ids(ids),
            Self::ByPath(path) => QueryKey::Text("path", path),
            Self::Root => QueryKey::Label("root folders"),
            Self::All => QueryKey::Label("all folders"),
        };
        describe(f, key)
    }
}

/// Constrained lookups over tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery {
    ById(Id),
    ByIds(Vec<Id>),
    ByName(String),
    All,
}

impl TagQuery {
    /// Render the query; no statements means the result is empty without
    /// asking the store
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        match self {
            Self::ById(id) => vec![Statement::filtered(
                TAG_SELECT,
                "id = ?",
                vec![Value::Integer(*id)],
            )],
            Self::ByIds(ids) => Statement::by_ids(TAG_SELECT, ids),
            Self::ByName(name) => vec![Statement::filtered(
                TAG_SELECT,
                "name = ?",
                vec![Value::Text(name.clone())],
            )],
            Self::All => vec![Statement::unfiltered(TAG_SELECT)],
        }
    }

    /// Render the tag listing in the requested order and page
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidSort` for a column outside [`TAG_COLUMNS`]
    /// and `DbError::Unsupported` for a lookup by id or name.
    pub fn listed(&self, options: &ListOptions) -> Result<Statement, DbError> {
        match self {
            Self::All => Statement::listed(TAG_SELECT, None, (Entity::Tag, TAG_COLUMNS), options),
            _ => Err(not_listable(self)),
        }
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::ById(id) => QueryKey::Id(*id),
            Self::ByIds(ids) => QueryKey::Ids(ids),
            Self::ByName(name) => QueryKey::Text("name", name),
            Self::All => QueryKey::Label("all tags"),
        };
        describe(f, key)
    }
}

enum QueryKey<'a> {
    Id(Id),
    Ids(&'a [Id]),
    Text(&'static str, &'a str),
    Label(&'static str),
}

fn describe(f: &mut fmt::Formatter<'_>, key: QueryKey<'_>) -> fmt::Result {
    match key {
        QueryKey::Id(id) => write!(f, "id {id}"),
        QueryKey::Ids(ids) => {
            let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
            write!(f, "ids [{}]", ids.join(", "))
        }
        QueryKey::Text(field, value) => write!(f, "{field} '{value}'"),
        QueryKey::Label(label) => f.write_str(label),
    }
}
