//! File-type classification used as the first segment of storage keys.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Images,
    Documents,
    Videos,
    Audio,
    Archives,
    Files,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Documents => "documents",
            Category::Videos => "videos",
            Category::Audio => "audio",
            Category::Archives => "archives",
            Category::Files => "files",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Order matters only if an extension were listed twice.
const FILE_TYPES: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff"],
    ),
    (
        Category::Documents,
        &[".pdf", ".doc", ".docx", ".txt", ".csv", ".xlsx"],
    ),
    (Category::Videos, &[".mp4", ".mkv", ".avi", ".mov", ".wmv"]),
    (Category::Audio, &[".mp3", ".wav", ".aac", ".flac"]),
    (Category::Archives, &[".zip", ".tar", ".gz", ".7z", ".rar"]),
];

/// Map an extension (`".png"`, `"PNG"`, ...) to its category.
///
/// Unknown or empty extensions land in [`Category::Files`].
pub fn classify(extension: &str) -> Category {
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        return Category::Files;
    }

    FILE_TYPES
        .iter()
        .find(|(_, exts)| exts.iter().any(|e| e[1..].eq_ignore_ascii_case(ext)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Files)
}

/// Split a path into `(stem, extension)`.
///
/// Only the last path segment is considered and leading dots do not start an
/// extension: `a/b.tar.gz` -> (`a/b.tar`, `.gz`), `.env` -> (`.env`, ``).
pub fn split_extension(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name[leading_dots..].rfind('.') {
        Some(i) => path.split_at(name_start + leading_dots + i),
        None => (path, ""),
    }
}

/// Lower-cased extension of a filename including the dot, or `""`.
pub fn extension_of(filename: &str) -> String {
    split_extension(filename).1.to_lowercase()
}
