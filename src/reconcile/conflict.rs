//! Pairwise comparison of platform projections of the same skill.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::dependent::to_slash_path;
use crate::core::{POINTER_MARKER, compute_hash, resolve_pointer};

use super::model::Projection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both point at the same canonical document; only metadata differs.
    Frontmatter,
    /// At least one side holds real content or they point at different targets.
    Content,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frontmatter => f.write_str("frontmatter"),
            Self::Content => f.write_str("content"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairConflict {
    pub skill: String,
    pub left: String,
    pub right: String,
    pub kind: ConflictKind,
}

/// Compare two projections, `None` when their normalized state is identical.
#[must_use]
pub fn compare_projections(
    skill: &str,
    left: &Projection,
    right: &Projection,
) -> Option<PairConflict> {
    if normalized_hash(left) == normalized_hash(right) {
        return None;
    }

    let kind = match (pointer_target(left), pointer_target(right)) {
        (Some(a), Some(b)) if a == b => ConflictKind::Frontmatter,
        _ => ConflictKind::Content,
    };
    Some(PairConflict {
        skill: skill.to_string(),
        left: left.platform.clone(),
        right: right.platform.clone(),
        kind,
    })
}

/// Check every unordered pair, in platform-name order.
#[must_use]
pub fn detect_conflicts(skill: &str, projections: &[Projection]) -> Vec<PairConflict> {
    let mut sorted: Vec<&Projection> = projections.iter().collect();
    sorted.sort_by(|a, b| a.platform.cmp(&b.platform));

    let mut conflicts = Vec::new();
    for (idx, left) in sorted.iter().enumerate() {
        for right in &sorted[idx + 1..] {
            if let Some(conflict) = compare_projections(skill, left, right) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}

fn pointer_target(projection: &Projection) -> Option<PathBuf> {
    projection
        .document
        .pointer()
        .and_then(|pointer| resolve_pointer(&projection.path, pointer))
}

/// Identity fields plus a location-independent body: a pointer is replaced by
/// the path it resolves to, since the same target is spelled differently
/// from different platform folders.
fn normalized_hash(projection: &Projection) -> String {
    let body = pointer_target(projection).map_or_else(
        || projection.document.body.replace("\r\n", "\n").trim_end().to_string(),
        |target| format!("{POINTER_MARKER}{}", to_slash_path(&target)),
    );
    compute_hash(&projection.document.identity(), &body, &[])
}
