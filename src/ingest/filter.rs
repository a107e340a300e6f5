use super::error::IngestError;
use regex::Regex;
use std::path::Path;

/// Decides which scanned files are indexed
///
/// A file passes when its extension is listed (or no extensions are
/// configured) and its path matches at least one pattern (or no patterns are
/// configured). Extensions compare case-insensitively and may be given with
/// or without the leading dot.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    extensions: Vec<String>,
    patterns: Vec<Regex>,
}

impl ScanFilter {
    /// Build a filter from configured extensions and regex patterns
    ///
    /// # Errors
    /// Returns `IngestError::InvalidRegex` if a pattern fails to compile.
    pub fn new(extensions: &[String], patterns: &[String]) -> Result<Self, IngestError> {
        let extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| IngestError::regex_compile(p, &e.to_string())))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            extensions,
            patterns,
        })
    }

    /// A filter that accepts every file
    #[must_use]
    pub fn accept_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        self.accepts_extension(path) && self.accepts_pattern(path)
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    fn accepts_pattern(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let path = path.to_string_lossy();
        self.patterns.iter().any(|p| p.is_match(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = ScanFilter::accept_all();
        assert!(filter.accepts(Path::new("/any/thing")));
        assert!(filter.accepts(Path::new("/no_extension")));
    }

    #[test]
    fn test_extensions_ignore_case_and_dot() {
        let filter = ScanFilter::new(&strings(&[".JPG", "png"]), &[]).unwrap();
        assert!(filter.accepts(Path::new("/a/photo.jpg")));
        assert!(filter.accepts(Path::new("/a/photo.PNG")));
        assert!(!filter.accepts(Path::new("/a/notes.txt")));
        assert!(!filter.accepts(Path::new("/a/Makefile")));
    }

    #[test]
    fn test_patterns_match_any() {
        let filter = ScanFilter::new(&[], &strings(&["/photos/", r"\.raw$"])).unwrap();
        assert!(filter.accepts(Path::new("/home/photos/x.txt")));
        assert!(filter.accepts(Path::new("/tmp/shot.raw")));
        assert!(!filter.accepts(Path::new("/tmp/shot.jpg")));
    }

    #[test]
    fn test_extensions_and_patterns_combine() {
        let filter = ScanFilter::new(&strings(&["jpg"]), &strings(&["keep"])).unwrap();
        assert!(filter.accepts(Path::new("/keep/a.jpg")));
        assert!(!filter.accepts(Path::new("/keep/a.png")));
        assert!(!filter.accepts(Path::new("/drop/a.jpg")));
    }

    #[test]
    fn test_invalid_regex() {
        let err = ScanFilter::new(&[], &strings(&["(unclosed"])).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidRegex { ref pattern, .. } if pattern == "(unclosed"
        ));
    }
}
