//! Content-type resolution from file extensions
//!
//! Maps a file's extension to a MIME type using a fixed table, optionally
//! extended by configuration. Resolution is total: any path yields a type,
//! falling back to `application/octet-stream` for unknown or missing
//! extensions.

use std::collections::HashMap;
use std::path::Path;

/// The fallback type for unknown or missing extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Builtin extension-to-MIME table
///
/// Lookup is case-sensitive: `PDF` is not `pdf`.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("7z", "application/x-7z-compressed"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
];

/// Resolves MIME types from file extensions
///
/// Splits the file name on its last `.` and looks the trailing segment up in
/// the table. A name without a `.`, or with an unmapped extension, resolves
/// to [`DEFAULT_CONTENT_TYPE`]. Never fails.
#[derive(Debug, Clone)]
pub struct ContentTypeResolver {
    types: HashMap<String, String>,
}

impl ContentTypeResolver {
    /// Create a resolver with the builtin table only
    #[must_use]
    pub fn new() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|(ext, mime)| ((*ext).to_string(), (*mime).to_string()))
            .collect();
        Self { types }
    }

    /// Create a resolver with configured pairs merged over the builtin table
    ///
    /// An override with a key already in the builtin table replaces the
    /// builtin mapping. Keys stay case-sensitive.
    #[must_use]
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut resolver = Self::new();
        for (ext, mime) in overrides {
            resolver.types.insert(ext, mime);
        }
        resolver
    }

    /// Resolve the MIME type for a path
    ///
    /// Total over all inputs; never returns an error.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> &str {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return DEFAULT_CONTENT_TYPE,
        };

        match name.rsplit_once('.') {
            Some((_, ext)) => self
                .types
                .get(ext)
                .map_or(DEFAULT_CONTENT_TYPE, String::as_str),
            None => DEFAULT_CONTENT_TYPE,
        }
    }

    /// Number of known extensions
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table is empty (never true in practice)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ContentTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
