//! In-memory view of one skill across canonical and every enabled platform.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::core::fields::{self, canonical_record};
use crate::core::{DependentFile, Document, compute_hash};

/// A platform-local copy of a skill's head document.
#[derive(Debug, Clone)]
pub struct Projection {
    pub platform: String,
    /// Path of the projection's `SKILL.md`.
    pub path: PathBuf,
    pub document: Document,
}

impl Projection {
    #[must_use]
    pub fn skill_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map_or_else(PathBuf::new, std::path::Path::to_path_buf)
    }
}

/// The source-of-truth copy of a skill.
#[derive(Debug, Clone)]
pub struct CanonicalSkill {
    /// Path of the canonical `SKILL.md`.
    pub path: PathBuf,
    pub document: Document,
    pub dependents: Vec<DependentFile>,
}

impl CanonicalSkill {
    /// Build a new canonical document from a raw projection's content.
    #[must_use]
    pub fn extract(name: &str, path: PathBuf, source: &Document) -> Self {
        let mut frontmatter = fields::identity_fields(&source.frontmatter);
        if !frontmatter.contains_key("name") {
            let mut named = Mapping::new();
            named.insert(Value::from("name"), Value::from(name));
            named.extend(frontmatter);
            frontmatter = named;
        }
        let mut skill = Self {
            path,
            document: Document::new(frontmatter, source.body.clone()),
            dependents: Vec::new(),
        };
        skill.refresh_hash();
        skill
    }

    #[must_use]
    pub fn skill_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map_or_else(PathBuf::new, std::path::Path::to_path_buf)
    }

    /// Fingerprint of the current identity fields, body and dependents.
    #[must_use]
    pub fn current_hash(&self) -> String {
        compute_hash(&self.document.identity(), &self.document.body, &self.dependents)
    }

    #[must_use]
    pub fn recorded_hash(&self) -> Option<&str> {
        self.document.recorded_hash()
    }

    /// Recompute the fingerprint and store it in the bookkeeping record.
    /// Returns true when the recorded value changed.
    pub fn refresh_hash(&mut self) -> bool {
        let hash = self.current_hash();
        if self.recorded_hash() == Some(hash.as_str()) {
            return false;
        }
        self.document.set_bookkeeping(canonical_record(&hash));
        true
    }

    /// Replace identity fields with `identity`, keeping canonical's private fields.
    pub fn replace_identity(&mut self, identity: &Mapping) {
        let stale: Vec<Value> = self
            .document
            .frontmatter
            .keys()
            .filter(|key| key.as_str().is_some_and(fields::is_identity_field))
            .cloned()
            .collect();
        for key in stale {
            self.document.frontmatter.remove(&key);
        }
        let mut frontmatter = identity.clone();
        frontmatter.extend(std::mem::take(&mut self.document.frontmatter));
        self.document.frontmatter = frontmatter;
    }
}

/// Everything known about a skill at the start of its reconciliation.
#[derive(Debug, Clone)]
pub struct SkillSet {
    pub name: String,
    /// Where the canonical document lives (or will be created).
    pub canonical_path: PathBuf,
    pub canonical: Option<CanonicalSkill>,
    /// One entry per enabled platform that holds a readable head document,
    /// ordered by platform name.
    pub projections: Vec<Projection>,
    /// Platforms whose head document exists but could not be read.
    pub unreadable: Vec<String>,
}
