//! Storage layer for skillsync
//!
//! The reconciliation engine reads and writes through [`FileStore`] so the
//! on-disk layout stays out of the core logic. [`FsStore`] is the real
//! filesystem implementation; [`SkillCatalog`] enumerates skills.

use std::path::Path;

use tracing::warn;

use crate::core::{DependentFile, Document};
use crate::error::Result;

pub mod catalog;
pub mod fs;

pub use catalog::{Platform, SkillCatalog};
pub use fs::FsStore;

pub trait FileStore {
    /// Read and parse a head document, `None` when it does not exist.
    fn read_document(&self, path: &Path) -> Result<Option<Document>>;

    fn write_document(&self, path: &Path, document: &Document) -> Result<()>;

    /// Names of the immediate subdirectories of `root` that hold a head document.
    fn list_skill_dirs(&self, root: &Path) -> Result<Vec<String>>;

    /// `/`-separated paths of every dependent file under `skill_dir`, sorted.
    fn list_dependent_files(&self, skill_dir: &Path) -> Result<Vec<String>>;

    fn hash_file(&self, path: &Path) -> Result<String>;

    /// Copy `from` to `to`, creating parent directories.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Remove empty directories below `root`; `root` itself is kept.
    fn prune_empty_dirs(&self, root: &Path) -> Result<()>;
}

/// Hash every dependent file in `dir`; unreadable files are logged and left out.
pub fn scan_dependents(store: &dyn FileStore, dir: &Path) -> Result<Vec<DependentFile>> {
    let mut files = Vec::new();
    for relative in store.list_dependent_files(dir)? {
        let path = dir.join(&relative);
        match store.hash_file(&path) {
            Ok(hash) => files.push(DependentFile::new(relative, hash)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable dependent file");
            }
        }
    }
    files.sort();
    Ok(files)
}
