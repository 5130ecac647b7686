//! Frontmatter field categories.
//!
//! Only the fields listed in [`FIELD_TABLE`] are part of a skill's identity.
//! Everything else in a frontmatter block is platform-private: it is never
//! hashed, compared, or merged.

use serde_yaml::{Mapping, Value};

/// Frontmatter key holding tool-managed sync state (`hash`, `version`).
pub const BOOKKEEPING_FIELD: &str = "skillsync";

/// Schema version written into the canonical bookkeeping record.
pub const SCHEMA_VERSION: u64 = 1;

/// How a field is reconciled between canonical and a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Copied when absent, conflict when different.
    Identity,
    /// De-duplicated union, target entries first.
    Union,
    /// Shallow object merge, canonical keys win.
    ShallowObject,
}

pub const FIELD_TABLE: &[(&str, MergeStrategy)] = &[
    ("name", MergeStrategy::Identity),
    ("description", MergeStrategy::Identity),
    ("license", MergeStrategy::Identity),
    ("compatibility", MergeStrategy::Identity),
    ("allowed-tools", MergeStrategy::Union),
    ("metadata", MergeStrategy::ShallowObject),
];

/// Look up the merge strategy for a field, `None` for platform-private fields.
#[must_use]
pub fn strategy_for(field: &str) -> Option<MergeStrategy> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, strategy)| *strategy)
}

#[must_use]
pub fn is_identity_field(field: &str) -> bool {
    strategy_for(field).is_some()
}

/// Project a frontmatter block onto its identity fields, preserving order.
#[must_use]
pub fn identity_fields(frontmatter: &Mapping) -> Mapping {
    let mut out = Mapping::new();
    for (key, value) in frontmatter {
        if key.as_str().is_some_and(is_identity_field) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Read the `hash` entry of the bookkeeping record, if any.
#[must_use]
pub fn recorded_hash(frontmatter: &Mapping) -> Option<&str> {
    frontmatter
        .get(BOOKKEEPING_FIELD)
        .and_then(Value::as_mapping)
        .and_then(|record| record.get("hash"))
        .and_then(Value::as_str)
}

/// Bookkeeping record stored on the canonical document.
#[must_use]
pub fn canonical_record(hash: &str) -> Value {
    let mut record = Mapping::new();
    record.insert(Value::from("hash"), Value::from(hash));
    record.insert(Value::from("version"), Value::from(SCHEMA_VERSION));
    Value::Mapping(record)
}

/// Bookkeeping record mirrored into a platform projection.
#[must_use]
pub fn projection_record(hash: &str) -> Value {
    let mut record = Mapping::new();
    record.insert(Value::from("hash"), Value::from(hash));
    Value::Mapping(record)
}
