//! Entity to presentation conversion

use super::routes::{Routes, reformat};
use super::types::{FolderSummary, WebAncestor, WebFile, WebFolder, WebTag};
use crate::db::{Database, DbError, File, Folder, Id, Tag};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Tag projections keyed by tag id
pub type TagLookup = HashMap<Id, WebTag>;

const FOLDER_ICON: &str = "bi-folder-fill";
const FILE_ICON: &str = "bi-file-earmark-fill";
/// Breadcrumb name of the root route
const ROOT_NAME: &str = "~";

/// Bootstrap icon class for a file of the given mimetype
#[must_use]
pub fn icon_for_mime(mime: Option<&str>) -> &'static str {
    let Some((major, minor)) = mime.and_then(|m| m.split_once('/')) else {
        return FILE_ICON;
    };
    match (major, minor) {
        ("image", _) => "bi-file-earmark-image-fill",
        ("audio", _) => "bi-file-earmark-music-fill",
        ("video", _) => "bi-file-earmark-play-fill",
        ("application", "pdf") => "bi-file-earmark-pdf-fill",
        _ => FILE_ICON,
    }
}

/// True if a preview can be generated for this mimetype
#[must_use]
pub fn is_previewable(mime: Option<&str>) -> bool {
    mime.and_then(|m| m.split_once('/'))
        .is_some_and(|(major, _)| major == "image")
}

/// Union of the tag ids on a folder, its subfolders and its files
#[must_use]
pub fn collect_tag_ids(
    folder: Option<&Folder>,
    subfolders: &[Folder],
    files: &[File],
) -> BTreeSet<Id> {
    folder
        .into_iter()
        .chain(subfolders)
        .flat_map(|f| f.tags.iter().copied())
        .chain(files.iter().flat_map(|f| f.tags.iter().copied()))
        .collect()
}

fn folder_name(folder: &Folder) -> String {
    folder
        .name
        .clone()
        .or_else(|| {
            Path::new(&folder.path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| folder.path.clone())
}

/// Turns store entities into presentation records
#[derive(Debug, Clone, Default)]
pub struct WebConverter {
    routes: Routes,
}

impl WebConverter {
    #[must_use]
    pub const fn new(routes: Routes) -> Self {
        Self { routes }
    }

    #[must_use]
    pub const fn routes(&self) -> &Routes {
        &self.routes
    }

    #[must_use]
    pub fn tag(&self, tag: &Tag) -> WebTag {
        WebTag {
            id: tag.id,
            name: tag.name.clone(),
            description: tag.description.clone(),
            count: tag.count,
            page: reformat(&self.routes.tag, &[("tag_id", tag.id)]),
        }
    }

    #[must_use]
    pub fn tag_lookup(&self, tags: &[Tag]) -> TagLookup {
        tags.iter().map(|tag| (tag.id, self.tag(tag))).collect()
    }

    /// Resolve `ids` through `lookup`, sorted by name; unknown ids are dropped
    fn resolve_tags(ids: &[Id], lookup: Option<&TagLookup>) -> Vec<WebTag> {
        let Some(lookup) = lookup else {
            return Vec::new();
        };
        let mut tags: Vec<WebTag> = ids.iter().filter_map(|id| lookup.get(id).cloned()).collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    #[must_use]
    pub fn folder_summary(&self, folder: &Folder) -> FolderSummary {
        FolderSummary {
            id: folder.id,
            path: folder.path.clone(),
            name: folder.name.clone(),
            description: folder.description.clone(),
            page: reformat(&self.routes.folder, &[("folder_id", folder.id)]),
            icon: FOLDER_ICON.to_string(),
        }
    }

    /// Project a file; `parent` fills the `parent` summary when given
    #[must_use]
    pub fn file(
        &self,
        file: &File,
        lookup: Option<&TagLookup>,
        parent: Option<&Folder>,
    ) -> WebFile {
        let preview = if is_previewable(file.mime.as_deref()) {
            reformat(&self.routes.file_preview, &[("file_id", file.id)])
        } else {
            self.routes.default_preview.clone()
        };
        WebFile {
            id: file.id,
            path: file.path.clone(),
            mime: file.mime.clone(),
            name: file.name.clone(),
            description: file.description.clone(),
            page: reformat(&self.routes.file, &[("file_id", file.id)]),
            icon: icon_for_mime(file.mime.as_deref()).to_string(),
            preview,
            tags: Self::resolve_tags(&file.tags, lookup),
            parent: parent.map(|folder| self.folder_summary(folder)),
        }
    }

    /// Project a folder without its contents or breadcrumbs
    #[must_use]
    pub fn folder(&self, folder: &Folder, lookup: Option<&TagLookup>) -> WebFolder {
        let summary = self.folder_summary(folder);
        WebFolder {
            id: summary.id,
            path: summary.path,
            name: summary.name,
            description: summary.description,
            page: summary.page,
            icon: summary.icon,
            tags: Self::resolve_tags(&folder.tags, lookup),
            files: Vec::new(),
            folders: Vec::new(),
            ancestry: Vec::new(),
        }
    }

    /// Breadcrumbs for a root-first folder chain, starting at the root route
    #[must_use]
    pub fn ancestry(&self, chain: &[Folder]) -> Vec<WebAncestor> {
        let root = WebAncestor {
            name: ROOT_NAME.to_string(),
            page: self.routes.root.clone(),
            current: false,
        };
        let mut crumbs: Vec<WebAncestor> = std::iter::once(root)
            .chain(chain.iter().map(|folder| WebAncestor {
                name: folder_name(folder),
                page: reformat(&self.routes.folder, &[("folder_id", folder.id)]),
                current: false,
            }))
            .collect();
        if let Some(last) = crumbs.last_mut() {
            last.current = true;
        }
        crumbs
    }

    /// Load and project a full folder page
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the folder does not exist.
    pub fn folder_page(&self, db: &Database, id: Id) -> Result<WebFolder, DbError> {
        let folder = db.get_folder(id)?;
        let subfolders = db.get_folders(&folder.folders)?;
        let files = db.get_files(&folder.files)?;
        let tag_ids: Vec<Id> = collect_tag_ids(Some(&folder), &subfolders, &files)
            .into_iter()
            .collect();
        let lookup = self.tag_lookup(&db.get_tags(&tag_ids)?);
        let chain = db.get_folder_ancestry(id)?;

        let mut page = self.folder(&folder, Some(&lookup));
        page.files = files
            .iter()
            .map(|file| self.file(file, Some(&lookup), None))
            .collect();
        page.folders = subfolders.iter().map(|f| self.folder_summary(f)).collect();
        page.ancestry = self.ancestry(&chain);
        Ok(page)
    }

    /// Load and project a file with its parent summary
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the file does not exist.
    pub fn file_page(&self, db: &Database, id: Id) -> Result<WebFile, DbError> {
        let file = db.get_file(id)?;
        let parent = file
            .parent_folder_id
            .map(|folder_id| db.get_folder(folder_id))
            .transpose()?;
        let lookup = self.tag_lookup(&db.get_tags(&file.tags)?);
        Ok(self.file(&file, Some(&lookup), parent.as_ref()))
    }

    /// Project many files at once, resolving all their tags in one lookup
    ///
    /// # Errors
    ///
    /// Returns `DbError` if tags cannot be loaded.
    pub fn files(&self, db: &Database, files: &[File]) -> Result<Vec<WebFile>, DbError> {
        let tag_ids: Vec<Id> = collect_tag_ids(None, &[], files).into_iter().collect();
        let lookup = self.tag_lookup(&db.get_tags(&tag_ids)?);
        Ok(files
            .iter()
            .map(|file| self.file(file, Some(&lookup), None))
            .collect())
    }

    /// Project many folders at once, resolving all their tags in one lookup
    ///
    /// # Errors
    ///
    /// Returns `DbError` if tags cannot be loaded.
    pub fn folders(&self, db: &Database, folders: &[Folder]) -> Result<Vec<WebFolder>, DbError> {
        let tag_ids: Vec<Id> = collect_tag_ids(None, folders, &[]).into_iter().collect();
        let lookup = self.tag_lookup(&db.get_tags(&tag_ids)?);
        Ok(folders
            .iter()
            .map(|folder| self.folder(folder, Some(&lookup)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AddSubfolderRequest;
    use crate::testing::TestDb;

    fn file(id: Id, mime: Option<&str>, tags: Vec<Id>) -> File {
        File {
            id,
            path: format!("/f/{id}"),
            mime: mime.map(str::to_string),
            name: None,
            description: None,
            tags,
            parent_folder_id: None,
        }
    }

    fn tag(id: Id, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            description: None,
            count: 1,
        }
    }

    #[test]
    fn test_icons_by_mime() {
        assert_eq!(icon_for_mime(Some("image/png")), "bi-file-earmark-image-fill");
        assert_eq!(icon_for_mime(Some("audio/ogg")), "bi-file-earmark-music-fill");
        assert_eq!(icon_for_mime(Some("video/mp4")), "bi-file-earmark-play-fill");
        assert_eq!(icon_for_mime(Some("application/pdf")), "bi-file-earmark-pdf-fill");
        assert_eq!(icon_for_mime(Some("application/zip")), FILE_ICON);
        assert_eq!(icon_for_mime(Some("garbage")), FILE_ICON);
        assert_eq!(icon_for_mime(None), FILE_ICON);
    }

    #[test]
    fn test_preview_only_for_images() {
        let converter = WebConverter::default();

        let image = converter.file(&file(4, Some("image/jpeg"), vec![]), None, None);
        assert_eq!(image.preview, "/files/4/preview");

        let text = converter.file(&file(5, Some("text/plain"), vec![]), None, None);
        assert_eq!(text.preview, Routes::default().default_preview);

        let unknown = converter.file(&file(6, None, vec![]), None, None);
        assert_eq!(unknown.preview, Routes::default().default_preview);
    }

    #[test]
    fn test_file_tags_sorted_by_name_and_missing_dropped() {
        let converter = WebConverter::default();
        let lookup = converter.tag_lookup(&[tag(1, "zebra"), tag(2, "apple"), tag(3, "mango")]);

        let projected = converter.file(&file(1, None, vec![1, 2, 3, 99]), Some(&lookup), None);
        let names: Vec<_> = projected.tags.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["apple", "mango", "zebra"]);
        assert_eq!(projected.page, "/files/1");
        assert_eq!(projected.tags[0].page, "/tags/2");
    }

    #[test]
    fn test_missing_lookup_drops_tags() {
        let converter = WebConverter::default();
        let projected = converter.file(&file(1, None, vec![1, 2]), None, None);
        assert!(projected.tags.is_empty());
    }

    #[test]
    fn test_folder_tags_sorted_by_name() {
        let converter = WebConverter::default();
        let lookup = converter.tag_lookup(&[tag(1, "b"), tag(2, "a")]);
        let folder = Folder {
            id: 3,
            path: "/x".into(),
            name: Some("x".into()),
            description: None,
            tags: vec![1, 2],
            files: vec![],
            folders: vec![],
        };

        let projected = converter.folder(&folder, Some(&lookup));
        let names: Vec<_> = projected.tags.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(projected.icon, FOLDER_ICON);
        assert_eq!(projected.page, "/folders/3");
    }

    #[test]
    fn test_custom_routes() {
        let converter = WebConverter::new(Routes {
            file: "/view?file={file_id}".into(),
            ..Routes::default()
        });
        assert_eq!(converter.file(&file(8, None, vec![]), None, None).page, "/view?file=8");
    }

    #[test]
    fn test_collect_tag_ids_unions_everything() {
        let folder = Folder {
            id: 1,
            path: "/p".into(),
            name: None,
            description: None,
            tags: vec![1, 2],
            files: vec![],
            folders: vec![],
        };
        let sub = Folder {
            tags: vec![2, 3],
            ..folder.clone()
        };
        let files = [file(1, None, vec![4, 1])];

        let ids = collect_tag_ids(Some(&folder), &[sub], &files);

        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(collect_tag_ids(None, &[], &[]).is_empty());
    }

    #[test]
    fn test_folder_page_with_ancestry() {
        let test_db = TestDb::new();
        let db = test_db.db();
        let (red, blue) = (test_db.tag("red"), test_db.tag("blue"));
        let photo = test_db.tagged_file("/home/pics/a.png", &[red]);
        let top = test_db.folder_with("/home", &[], &[]);
        let pics = test_db.folder_with("/home/pics", &[blue], &[photo.id]);
        let deeper = test_db.folder_with("/home/pics/old", &[], &[]);
        db.add_subfolder(&AddSubfolderRequest {
            parent_id: top.id,
            child_id: pics.id,
        })
        .unwrap();
        db.add_subfolder(&AddSubfolderRequest {
            parent_id: pics.id,
            child_id: deeper.id,
        })
        .unwrap();

        let page = WebConverter::default().folder_page(db, pics.id).unwrap();

        assert_eq!(page.tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![blue]);
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.files[0].tags[0].name, "red");
        assert_eq!(page.folders.len(), 1);
        assert_eq!(page.folders[0].id, deeper.id);

        let crumbs: Vec<_> = page.ancestry.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(crumbs, vec!["~", "home", "pics"]);
        assert!(page.ancestry.last().unwrap().current);
        assert!(!page.ancestry[0].current);
    }

    #[test]
    fn test_file_page_has_parent_summary() {
        let test_db = TestDb::new();
        let tag = test_db.tag("t");
        let file = test_db.tagged_file("/d/f.mp3", &[tag]);
        let folder = test_db.folder_with("/d", &[], &[file.id]);

        let page = WebConverter::default().file_page(test_db.db(), file.id).unwrap();

        assert_eq!(page.parent.as_ref().map(|p| p.id), Some(folder.id));
        assert_eq!(page.tags.len(), 1);
    }
}
