//! Decision providers: who answers when the engine cannot decide alone.
//!
//! Interactive front ends prompt a human; [`StrictDecisions`] fails instead
//! of blocking; [`KeepCanonicalDecisions`] is the pre-declared
//! non-interactive policy that always favors canonical.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

use super::dependents::DependentConflict;
use super::drift::OutOfSyncSkill;
use super::merge::FieldConflict;

/// Answer to a single metadata field conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataChoice {
    UseCanonical,
    UseTarget,
    /// Stop resolving this skill's remaining conflicts, keeping target values.
    SkipRemaining,
}

/// Answer to a dependent-file conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependentChoice {
    UseCanonical,
    UsePlatform(String),
    Skip,
    Abort,
}

/// Action applied to an out-of-sync projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    KeepPlatform,
    KeepCanonical,
    Abort,
}

impl SyncAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::KeepPlatform => "keep-platform",
            Self::KeepCanonical => "keep-canonical",
            Self::Abort => "abort",
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub trait DecisionProvider {
    fn resolve_metadata_conflict(
        &mut self,
        skill: &str,
        conflict: &FieldConflict,
    ) -> Result<MetadataChoice>;

    fn resolve_dependent_conflict(&mut self, conflict: &DependentConflict)
    -> Result<DependentChoice>;

    /// Must return one of `legal`.
    fn resolve_out_of_sync(
        &mut self,
        skill: &OutOfSyncSkill,
        legal: &[SyncAction],
    ) -> Result<SyncAction>;
}

impl<T: DecisionProvider + ?Sized> DecisionProvider for Box<T> {
    fn resolve_metadata_conflict(
        &mut self,
        skill: &str,
        conflict: &FieldConflict,
    ) -> Result<MetadataChoice> {
        (**self).resolve_metadata_conflict(skill, conflict)
    }

    fn resolve_dependent_conflict(
        &mut self,
        conflict: &DependentConflict,
    ) -> Result<DependentChoice> {
        (**self).resolve_dependent_conflict(conflict)
    }

    fn resolve_out_of_sync(
        &mut self,
        skill: &OutOfSyncSkill,
        legal: &[SyncAction],
    ) -> Result<SyncAction> {
        (**self).resolve_out_of_sync(skill, legal)
    }
}

/// Non-interactive mode: every question is a hard failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictDecisions;

impl DecisionProvider for StrictDecisions {
    fn resolve_metadata_conflict(
        &mut self,
        skill: &str,
        conflict: &FieldConflict,
    ) -> Result<MetadataChoice> {
        Err(SyncError::ConflictUnresolved(format!(
            "{skill}: field '{}' differs between canonical and target",
            conflict.field
        )))
    }

    fn resolve_dependent_conflict(
        &mut self,
        conflict: &DependentConflict,
    ) -> Result<DependentChoice> {
        Err(SyncError::DecisionRequired(format!(
            "{}: dependent file '{}' has conflicting versions",
            conflict.skill, conflict.relative_path
        )))
    }

    fn resolve_out_of_sync(
        &mut self,
        skill: &OutOfSyncSkill,
        _legal: &[SyncAction],
    ) -> Result<SyncAction> {
        Err(SyncError::DecisionRequired(format!(
            "{}: {} projection is out of sync ({})",
            skill.skill, skill.platform, skill.mismatch
        )))
    }
}

/// Non-interactive policy: canonical always wins, platform edits are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepCanonicalDecisions;

impl DecisionProvider for KeepCanonicalDecisions {
    fn resolve_metadata_conflict(
        &mut self,
        _skill: &str,
        _conflict: &FieldConflict,
    ) -> Result<MetadataChoice> {
        Ok(MetadataChoice::UseCanonical)
    }

    fn resolve_dependent_conflict(
        &mut self,
        conflict: &DependentConflict,
    ) -> Result<DependentChoice> {
        if conflict.canonical_hash.is_some() {
            Ok(DependentChoice::UseCanonical)
        } else {
            Ok(DependentChoice::Skip)
        }
    }

    fn resolve_out_of_sync(
        &mut self,
        _skill: &OutOfSyncSkill,
        _legal: &[SyncAction],
    ) -> Result<SyncAction> {
        Ok(SyncAction::KeepCanonical)
    }
}
