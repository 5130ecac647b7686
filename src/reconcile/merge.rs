//! Field-categorized metadata merge from canonical into a projection.
//!
//! Each identity field of canonical is merged according to its entry in
//! [`FIELD_TABLE`](crate::core::FIELD_TABLE). Platform-private fields of the
//! target are never touched. The bookkeeping record is handled separately by
//! [`override_bookkeeping`] after the general merge.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::core::fields::{self, BOOKKEEPING_FIELD, MergeStrategy, projection_record};
use crate::core::hash::values_equal;
use crate::error::Result;

use super::decision::{DecisionProvider, MetadataChoice};

/// An identity field whose canonical and target values disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldConflict {
    pub field: String,
    pub canonical_value: Value,
    pub target_value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Target frontmatter with every non-conflicting field merged. Conflicting
    /// fields still hold the target's value.
    pub merged: Mapping,
    pub conflicts: Vec<FieldConflict>,
}

/// Merge `canonical` into `target` without resolving conflicts.
#[must_use]
pub fn merge(canonical: &Mapping, target: &Mapping) -> MergeOutcome {
    let mut merged = target.clone();
    let mut conflicts = Vec::new();

    for (key, canonical_value) in canonical {
        let Some(field) = key.as_str() else {
            continue;
        };
        let Some(strategy) = fields::strategy_for(field) else {
            continue;
        };

        let Some(target_value) = merged.get(key) else {
            merged.insert(key.clone(), canonical_value.clone());
            continue;
        };
        if values_equal(target_value, canonical_value) {
            continue;
        }

        let combined = match strategy {
            MergeStrategy::Identity => None,
            MergeStrategy::Union => Some(union_values(target_value, canonical_value)),
            MergeStrategy::ShallowObject => shallow_merge(target_value, canonical_value),
        };
        match combined {
            Some(value) => {
                merged.insert(key.clone(), value);
            }
            None => conflicts.push(FieldConflict {
                field: field.to_string(),
                canonical_value: canonical_value.clone(),
                target_value: target_value.clone(),
            }),
        }
    }

    override_bookkeeping(canonical, &mut merged);
    MergeOutcome { merged, conflicts }
}

/// Canonical's recorded hash always replaces the target's record.
pub fn override_bookkeeping(canonical: &Mapping, target: &mut Mapping) {
    if let Some(hash) = fields::recorded_hash(canonical) {
        target.insert(Value::from(BOOKKEEPING_FIELD), projection_record(hash));
    }
}

/// Merge and then settle every conflict through `decisions`.
///
/// `skipping` carries a `skip-remaining` answer across calls for the same
/// skill: once set, later conflicts keep the target value unasked.
pub fn merge_resolved(
    skill: &str,
    canonical: &Mapping,
    target: &Mapping,
    decisions: &mut dyn DecisionProvider,
    skipping: &mut bool,
) -> Result<Mapping> {
    let outcome = merge(canonical, target);
    resolve_conflicts(skill, outcome, decisions, skipping)
}

pub fn resolve_conflicts(
    skill: &str,
    outcome: MergeOutcome,
    decisions: &mut dyn DecisionProvider,
    skipping: &mut bool,
) -> Result<Mapping> {
    let MergeOutcome {
        mut merged,
        conflicts,
    } = outcome;

    for conflict in &conflicts {
        if *skipping {
            debug!(skill, field = %conflict.field, "conflict skipped; keeping target value");
            continue;
        }
        match decisions.resolve_metadata_conflict(skill, conflict)? {
            MetadataChoice::UseCanonical => {
                debug!(skill, field = %conflict.field, "using canonical value");
                merged.insert(
                    Value::from(conflict.field.as_str()),
                    conflict.canonical_value.clone(),
                );
            }
            MetadataChoice::UseTarget => {
                debug!(skill, field = %conflict.field, "keeping target value");
            }
            MetadataChoice::SkipRemaining => {
                debug!(skill, field = %conflict.field, "skipping remaining conflicts");
                *skipping = true;
            }
        }
    }

    Ok(merged)
}

fn union_values(target: &Value, canonical: &Value) -> Value {
    let mut out: Vec<Value> = Vec::new();
    for entry in entries(target).into_iter().chain(entries(canonical)) {
        if !out.iter().any(|existing| values_equal(existing, &entry)) {
            out.push(entry);
        }
    }
    Value::Sequence(out)
}

fn entries(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn shallow_merge(target: &Value, canonical: &Value) -> Option<Value> {
    let (Value::Mapping(target), Value::Mapping(canonical)) = (target, canonical) else {
        return None;
    };
    let mut out = target.clone();
    for (key, value) in canonical {
        out.insert(key.clone(), value.clone());
    }
    Some(Value::Mapping(out))
}
