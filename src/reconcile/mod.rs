//! Reconciliation of skills across canonical and platform folders.
//!
//! Detection ([`conflict`], [`drift`]) never writes. Resolution
//! ([`resolution`], [`merge`], [`dependents`]) acts only on answers from a
//! [`DecisionProvider`]. [`engine`] drives the per-skill pass.

pub mod conflict;
pub mod decision;
pub mod dependents;
pub mod drift;
pub mod engine;
pub mod merge;
pub mod model;
pub mod resolution;

pub use conflict::{ConflictKind, PairConflict, compare_projections, detect_conflicts};
pub use decision::{
    DecisionProvider, DependentChoice, KeepCanonicalDecisions, MetadataChoice, StrictDecisions,
    SyncAction,
};
pub use dependents::{ConsolidationOutcome, Consolidator, DependentConflict, plan_consolidation};
pub use drift::{Mismatch, OutOfSyncSkill, detect_drift};
pub use engine::{Flow, ReconcileOptions, Reconciler, SkillStatus, SyncReport};
pub use merge::{FieldConflict, MergeOutcome, merge, merge_resolved};
pub use model::{CanonicalSkill, Projection, SkillSet};
pub use resolution::{adopt_platform, legal_actions, regenerate_projection};
