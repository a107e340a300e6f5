//! Route templates for projected entities
//!
//! Templates contain `{name}` placeholders that [`reformat`] fills in.

use crate::db::Id;
use serde::{Deserialize, Serialize};

/// Route table handed to the converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub root: String,
    pub folder: String,
    pub file: String,
    pub file_preview: String,
    pub tag: String,
    /// Preview shown for files that have no generated preview
    pub default_preview: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            root: "/".into(),
            folder: "/folders/{folder_id}".into(),
            file: "/files/{file_id}".into(),
            file_preview: "/files/{file_id}/preview".into(),
            tag: "/tags/{tag_id}".into(),
            default_preview: "/static/default_preview.svg".into(),
        }
    }
}

/// Replace every `{key}` in `route` with its value
///
/// Unknown placeholders are left as they are.
///
/// # Examples
/// ```
/// # use filetag::view::routes::reformat;
/// assert_eq!(reformat("/files/{file_id}", &[("file_id", 7)]), "/files/7");
/// ```
#[must_use]
pub fn reformat(route: &str, params: &[(&str, Id)]) -> String {
    params
        .iter()
        .fold(route.to_string(), |route, (key, value)| {
            route.replace(&format!("{{{key}}}"), &value.to_string())
        })
}
