//! Filesystem-backed [`FileStore`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use walkdir::WalkDir;

use crate::core::dependent::{is_housekeeping_dir, is_housekeeping_file, to_slash_path};
use crate::core::{Document, HEAD_DOCUMENT, hash_bytes};
use crate::error::{Result, SyncError};

use super::FileStore;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Write through a temp file in the same directory so readers never
    /// observe a partial document.
    fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            SyncError::ValidationFailed(format!("no parent directory for {}", path.display()))
        })?;
        fs::create_dir_all(parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents)?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl FileStore for FsStore {
    fn read_document(&self, path: &Path) -> Result<Option<Document>> {
        let Some(content) = read_text(path)? else {
            return Ok(None);
        };
        match Document::parse(&content) {
            Ok(document) => Ok(Some(document)),
            Err(SyncError::InvalidDocument(msg)) => Err(SyncError::InvalidDocument(format!(
                "{}: {msg}",
                path.display()
            ))),
            Err(err) => Err(err),
        }
    }

    fn write_document(&self, path: &Path, document: &Document) -> Result<()> {
        let rendered = document.render()?;
        Self::write_atomic(path, rendered.as_bytes())
    }

    fn list_skill_dirs(&self, root: &Path) -> Result<Vec<String>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() || !path.join(HEAD_DOCUMENT).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_dependent_files(&self, skill_dir: &Path) -> Result<Vec<String>> {
        if !skill_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(skill_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && entry.file_name().to_str().is_some_and(is_housekeeping_dir))
            });
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_housekeeping_file(&name) || (entry.depth() == 1 && name == HEAD_DOCUMENT) {
                continue;
            }
            let relative = entry.path().strip_prefix(skill_dir).unwrap_or(entry.path());
            files.push(to_slash_path(relative));
        }
        files.sort();
        Ok(files)
    }

    fn hash_file(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        Ok(hash_bytes(&bytes))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let bytes = fs::read(from)?;
        Self::write_atomic(to, &bytes)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)?;
        Ok(())
    }

    fn prune_empty_dirs(&self, root: &Path) -> Result<()> {
        if !root.is_dir() {
            return Ok(());
        }
        // Deepest first so parents empty out before they are visited.
        for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let is_empty = fs::read_dir(entry.path())?.next().is_none();
            if is_empty {
                fs::remove_dir(entry.path())?;
            }
        }
        Ok(())
    }
}

/// Read a head document's text, `None` when the file does not exist.
fn read_text(path: &Path) -> Result<Option<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    String::from_utf8(bytes).map(Some).map_err(|err| {
        SyncError::InvalidDocument(format!(
            "{}: not valid UTF-8 (byte {})",
            path.display(),
            err.utf8_error().valid_up_to()
        ))
    })
}
