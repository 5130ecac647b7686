//! Dependent files: everything in a skill folder besides the head document.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Directory names that never hold skill content.
pub const HOUSEKEEPING_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".venv",
];

/// Stray files ignored alongside housekeeping directories.
pub const HOUSEKEEPING_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// A file attached to a skill, identified by its `/`-separated path relative
/// to the skill folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependentFile {
    pub relative_path: String,
    pub hash: String,
}

impl DependentFile {
    pub fn new(relative_path: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            hash: hash.into(),
        }
    }
}

#[must_use]
pub fn is_housekeeping_dir(name: &str) -> bool {
    HOUSEKEEPING_DIRS.contains(&name)
}

#[must_use]
pub fn is_housekeeping_file(name: &str) -> bool {
    HOUSEKEEPING_FILES.contains(&name)
}

/// Render a relative path with `/` separators regardless of platform.
#[must_use]
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
