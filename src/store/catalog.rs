//! Skill enumeration across the canonical folder and enabled platforms.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::HEAD_DOCUMENT;
use crate::error::{Result, SyncError};
use crate::reconcile::model::{CanonicalSkill, Projection, SkillSet};

use super::{FileStore, scan_dependents};

/// An enabled platform and the folder holding its skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub name: String,
    pub skills_dir: PathBuf,
}

impl Platform {
    pub fn new(name: impl Into<String>, skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            skills_dir: skills_dir.into(),
        }
    }

    #[must_use]
    pub fn skill_dir(&self, skill: &str) -> PathBuf {
        self.skills_dir.join(skill)
    }

    #[must_use]
    pub fn doc_path(&self, skill: &str) -> PathBuf {
        self.skill_dir(skill).join(HEAD_DOCUMENT)
    }
}

#[derive(Debug, Clone)]
pub struct SkillCatalog {
    canonical_dir: PathBuf,
    platforms: Vec<Platform>,
}

impl SkillCatalog {
    /// Platforms are kept sorted by name.
    #[must_use]
    pub fn new(canonical_dir: impl Into<PathBuf>, mut platforms: Vec<Platform>) -> Self {
        platforms.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            canonical_dir: canonical_dir.into(),
            platforms,
        }
    }

    /// Resolve configured folders against the project root, keeping enabled platforms.
    #[must_use]
    pub fn from_config(root: &Path, config: &Config) -> Self {
        let platforms = config
            .platforms
            .iter()
            .filter(|platform| platform.enabled)
            .map(|platform| Platform::new(&platform.name, resolve_dir(root, &platform.dir)))
            .collect();
        Self::new(resolve_dir(root, &config.canonical.dir), platforms)
    }

    #[must_use]
    pub fn canonical_dir(&self) -> &Path {
        &self.canonical_dir
    }

    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    #[must_use]
    pub fn canonical_skill_dir(&self, skill: &str) -> PathBuf {
        self.canonical_dir.join(skill)
    }

    #[must_use]
    pub fn canonical_doc(&self, skill: &str) -> PathBuf {
        self.canonical_skill_dir(skill).join(HEAD_DOCUMENT)
    }

    /// Every skill name known to canonical or any enabled platform, sorted.
    pub fn skill_names(&self, store: &dyn FileStore) -> Result<BTreeSet<String>> {
        let mut names: BTreeSet<String> = store
            .list_skill_dirs(&self.canonical_dir)?
            .into_iter()
            .collect();
        for platform in &self.platforms {
            match store.list_skill_dirs(&platform.skills_dir) {
                Ok(found) => names.extend(found),
                Err(err) => {
                    warn!(
                        platform = %platform.name,
                        error = %err,
                        "failed to list platform skills"
                    );
                }
            }
        }
        Ok(names)
    }

    /// Read canonical and every platform projection for `skill`.
    ///
    /// An unreadable canonical document fails the skill; unreadable
    /// projections are logged and left out.
    pub fn load(&self, store: &dyn FileStore, skill: &str) -> Result<SkillSet> {
        let canonical_path = self.canonical_doc(skill);
        let canonical = match store.read_document(&canonical_path)? {
            Some(document) => Some(CanonicalSkill {
                path: canonical_path.clone(),
                document,
                dependents: scan_dependents(store, &self.canonical_skill_dir(skill))?,
            }),
            None => None,
        };

        let mut projections = Vec::new();
        let mut unreadable = Vec::new();
        for platform in &self.platforms {
            let path = platform.doc_path(skill);
            match store.read_document(&path) {
                Ok(Some(document)) => projections.push(Projection {
                    platform: platform.name.clone(),
                    path,
                    document,
                }),
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        skill,
                        platform = %platform.name,
                        error = %err,
                        "skipping unreadable projection"
                    );
                    unreadable.push(platform.name.clone());
                }
            }
        }
        debug!(
            skill,
            canonical = canonical.is_some(),
            projections = projections.len(),
            "loaded skill"
        );

        Ok(SkillSet {
            name: skill.to_string(),
            canonical_path,
            canonical,
            projections,
            unreadable,
        })
    }

    /// Fail on names no folder knows about.
    pub fn ensure_known(&self, store: &dyn FileStore, requested: &[String]) -> Result<()> {
        let known = self.skill_names(store)?;
        for name in requested {
            if !known.contains(name) {
                return Err(SyncError::SkillNotFound(name.clone()));
            }
        }
        Ok(())
    }
}

fn resolve_dir(root: &Path, dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
