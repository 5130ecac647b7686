//! Shared test utilities for skillsync.

use std::collections::VecDeque;

use crate::error::{Result, SyncError};
use crate::reconcile::decision::{DecisionProvider, DependentChoice, MetadataChoice, SyncAction};
use crate::reconcile::dependents::DependentConflict;
use crate::reconcile::drift::OutOfSyncSkill;
use crate::reconcile::merge::FieldConflict;

pub mod fixtures;

pub use fixtures::{SkillFixture, UnitTestFixture};

/// Table-driven test case structure.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
    pub should_panic: bool,
}

/// Run table-driven tests with detailed logging.
pub fn run_table_tests<I, E, F>(
    cases: Vec<TestCase<I, E>>,
    test_fn: F,
) -> std::result::Result<(), String>
where
    I: std::fmt::Debug + Clone + std::panic::RefUnwindSafe,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    for case in cases {
        let start = std::time::Instant::now();
        println!("[TEST] Running: {}", case.name);
        println!("[TEST] Input: {:?}", case.input);

        let result = std::panic::catch_unwind(|| test_fn(case.input.clone()));
        let elapsed = start.elapsed();

        if case.should_panic {
            if result.is_ok() {
                return Err(format!("Test '{}' expected panic", case.name));
            }
            println!("[TEST] Expected panic occurred");
            println!("[TEST] PASSED: {} ({:?})\n", case.name, elapsed);
            continue;
        }

        let Ok(actual) = result else {
            return Err(format!("Test '{}' panicked unexpectedly", case.name));
        };

        println!("[TEST] Expected: {:?}", case.expected);
        println!("[TEST] Actual: {actual:?}");
        println!("[TEST] Timing: {elapsed:?}");

        if actual != case.expected {
            return Err(format!(
                "Test '{}' failed: expected {:?}, got {:?}",
                case.name, case.expected, actual
            ));
        }
        println!("[TEST] PASSED: {} ({:?})\n", case.name, elapsed);
    }
    Ok(())
}

/// Decision provider that replays queued answers and records every question.
///
/// Running out of answers is an error, so a test fails loudly when the
/// engine asks something unexpected.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    metadata: VecDeque<MetadataChoice>,
    dependents: VecDeque<DependentChoice>,
    actions: VecDeque<SyncAction>,
    pub metadata_asked: Vec<(String, FieldConflict)>,
    pub dependents_asked: Vec<DependentConflict>,
    pub drift_asked: Vec<(OutOfSyncSkill, Vec<SyncAction>)>,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_metadata(mut self, choice: MetadataChoice) -> Self {
        self.metadata.push_back(choice);
        self
    }

    #[must_use]
    pub fn with_dependent(mut self, choice: DependentChoice) -> Self {
        self.dependents.push_back(choice);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: SyncAction) -> Self {
        self.actions.push_back(action);
        self
    }

    #[must_use]
    pub fn metadata_questions(&self) -> usize {
        self.metadata_asked.len()
    }

    #[must_use]
    pub fn dependent_questions(&self) -> usize {
        self.dependents_asked.len()
    }

    #[must_use]
    pub fn drift_questions(&self) -> usize {
        self.drift_asked.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn resolve_metadata_conflict(
        &mut self,
        skill: &str,
        conflict: &FieldConflict,
    ) -> Result<MetadataChoice> {
        self.metadata_asked.push((skill.to_string(), conflict.clone()));
        self.metadata.pop_front().ok_or_else(|| {
            SyncError::DecisionRequired(format!(
                "unscripted metadata conflict on {}",
                conflict.field
            ))
        })
    }

    fn resolve_dependent_conflict(
        &mut self,
        conflict: &DependentConflict,
    ) -> Result<DependentChoice> {
        self.dependents_asked.push(conflict.clone());
        self.dependents.pop_front().ok_or_else(|| {
            SyncError::DecisionRequired(format!(
                "unscripted dependent conflict on {}",
                conflict.relative_path
            ))
        })
    }

    fn resolve_out_of_sync(
        &mut self,
        skill: &OutOfSyncSkill,
        legal: &[SyncAction],
    ) -> Result<SyncAction> {
        self.drift_asked.push((skill.clone(), legal.to_vec()));
        self.actions.pop_front().ok_or_else(|| {
            SyncError::DecisionRequired(format!(
                "unscripted drift on {}:{}",
                skill.platform, skill.skill
            ))
        })
    }
}
