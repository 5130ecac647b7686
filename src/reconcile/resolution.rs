//! Legal resolution actions for drifted projections, and the document
//! transformations those actions perform.

use serde_yaml::Value;

use crate::core::{Document, DocumentForm, build_pointer, fields};

use super::decision::SyncAction;
use super::drift::OutOfSyncSkill;
use super::merge::override_bookkeeping;
use super::model::{CanonicalSkill, Projection};

/// Actions a user may choose for a drifted projection.
///
/// A pointer-form projection whose pointer is wrong is a mechanical error, so
/// keeping it is never offered.
#[must_use]
pub fn legal_actions(out_of_sync: &OutOfSyncSkill) -> Vec<SyncAction> {
    if out_of_sync.mismatch.touches_body() && out_of_sync.pointer_form {
        vec![SyncAction::KeepCanonical, SyncAction::Abort]
    } else {
        vec![
            SyncAction::KeepPlatform,
            SyncAction::KeepCanonical,
            SyncAction::Abort,
        ]
    }
}

/// Build the pointer-form projection for `canonical` at `path`.
///
/// Identity fields and the bookkeeping record come from canonical; the
/// existing document's platform-private fields are preserved.
#[must_use]
pub fn regenerate_projection(
    existing: Option<&Document>,
    path: &std::path::Path,
    canonical: &CanonicalSkill,
) -> Document {
    let canonical_identity = canonical.document.identity();
    let mut frontmatter = existing
        .map(|doc| doc.frontmatter.clone())
        .unwrap_or_default();

    let stale: Vec<Value> = frontmatter
        .keys()
        .filter(|key| {
            key.as_str().is_some_and(fields::is_identity_field)
                && !canonical_identity.contains_key(*key)
        })
        .cloned()
        .collect();
    for key in stale {
        frontmatter.remove(&key);
    }
    for (key, value) in canonical_identity {
        frontmatter.insert(key, value);
    }
    override_bookkeeping(&canonical.document.frontmatter, &mut frontmatter);

    let pointer = build_pointer(path, &canonical.path);
    Document::new(frontmatter, format!("{pointer}\n"))
}

/// Make the projection's live content the new canonical state.
pub fn adopt_platform(canonical: &mut CanonicalSkill, projection: &Projection) {
    if projection.document.form() == DocumentForm::Raw {
        canonical.document.body.clone_from(&projection.document.body);
    }
    canonical.replace_identity(&projection.document.identity());
    canonical.refresh_hash();
}
