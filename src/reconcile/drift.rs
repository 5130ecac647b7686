//! Drift detection: a projection compared against canonical truth.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::hash::mappings_equal;
use crate::core::{DocumentForm, bodies_equal, build_pointer};

use super::model::{CanonicalSkill, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    Body,
    Frontmatter,
    Both,
}

impl Mismatch {
    #[must_use]
    pub const fn classify(body: bool, frontmatter: bool) -> Option<Self> {
        match (body, frontmatter) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Body),
            (false, true) => Some(Self::Frontmatter),
            (false, false) => None,
        }
    }

    #[must_use]
    pub const fn touches_body(self) -> bool {
        matches!(self, Self::Body | Self::Both)
    }
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Body => f.write_str("body"),
            Self::Frontmatter => f.write_str("frontmatter"),
            Self::Both => f.write_str("both"),
        }
    }
}

/// A projection whose state has drifted from canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutOfSyncSkill {
    pub skill: String,
    pub platform: String,
    pub path: PathBuf,
    pub pointer_form: bool,
    pub mismatch: Mismatch,
    /// Pointer the projection should hold.
    pub expected_pointer: String,
}

/// Compare a projection against canonical.
///
/// Canonical without a recorded hash has nothing to drift from, so nothing
/// is reported.
#[must_use]
pub fn detect_drift(
    skill: &str,
    projection: &Projection,
    canonical: &CanonicalSkill,
) -> Option<OutOfSyncSkill> {
    canonical.recorded_hash()?;

    let expected_pointer = build_pointer(&projection.path, &canonical.path);
    let form = projection.document.form();
    let body_mismatch = match form {
        DocumentForm::Pointer => projection.document.pointer() != Some(expected_pointer.as_str()),
        DocumentForm::Raw => !bodies_equal(&projection.document.body, &canonical.document.body),
    };
    let frontmatter_mismatch =
        !mappings_equal(&projection.document.identity(), &canonical.document.identity());

    let mismatch = Mismatch::classify(body_mismatch, frontmatter_mismatch)?;
    Some(OutOfSyncSkill {
        skill: skill.to_string(),
        platform: projection.platform.clone(),
        path: projection.path.clone(),
        pointer_form: form == DocumentForm::Pointer,
        mismatch,
        expected_pointer,
    })
}
