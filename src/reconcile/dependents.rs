//! Consolidation of dependent files from platform folders into canonical.
//!
//! Planning is pure: [`plan_consolidation`] decides, per relative path, which
//! version becomes canonical and which paths conflict. [`Consolidator`] then
//! asks for decisions, copies the chosen versions, and cleans the platform
//! copies that were recorded as contributors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::DependentFile;
use crate::error::{Result, SyncError};
use crate::store::{FileStore, scan_dependents};

use super::decision::{DecisionProvider, DependentChoice};
use super::engine::Flow;

/// One platform's version of a dependent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformVersion {
    pub platform: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentConflict {
    pub skill: String,
    pub relative_path: String,
    pub canonical_hash: Option<String>,
    pub versions: Vec<PlatformVersion>,
}

impl DependentConflict {
    /// Choices that make sense for this conflict.
    #[must_use]
    pub fn choices(&self) -> Vec<DependentChoice> {
        let mut choices = Vec::new();
        if self.canonical_hash.is_some() {
            choices.push(DependentChoice::UseCanonical);
        }
        choices.extend(
            self.versions
                .iter()
                .map(|version| DependentChoice::UsePlatform(version.platform.clone())),
        );
        choices.push(DependentChoice::Skip);
        choices.push(DependentChoice::Abort);
        choices
    }
}

/// The version of a path that will be written to canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub platform: String,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationPlan {
    pub candidates: BTreeMap<String, Candidate>,
    pub conflicts: Vec<DependentConflict>,
    /// Platforms that held a copy of each path when the pass started.
    pub contributors: BTreeMap<String, BTreeSet<String>>,
}

/// Decide, per relative path, what becomes canonical.
#[must_use]
pub fn plan_consolidation(
    skill: &str,
    platform_files: &BTreeMap<String, Vec<DependentFile>>,
    canonical_files: &[DependentFile],
) -> ConsolidationPlan {
    let canonical: BTreeMap<&str, &str> = canonical_files
        .iter()
        .map(|file| (file.relative_path.as_str(), file.hash.as_str()))
        .collect();

    let mut by_path: BTreeMap<String, Vec<PlatformVersion>> = BTreeMap::new();
    for (platform, files) in platform_files {
        for file in files {
            by_path
                .entry(file.relative_path.clone())
                .or_default()
                .push(PlatformVersion {
                    platform: platform.clone(),
                    hash: file.hash.clone(),
                });
        }
    }

    let mut plan = ConsolidationPlan::default();
    for (path, versions) in by_path {
        plan.contributors.insert(
            path.clone(),
            versions.iter().map(|v| v.platform.clone()).collect(),
        );

        let canonical_hash = canonical.get(path.as_str()).copied();
        let platforms_agree = versions.windows(2).all(|pair| pair[0].hash == pair[1].hash);
        let differs_from_canonical =
            canonical_hash.is_some_and(|hash| versions.iter().any(|v| v.hash != hash));

        if platforms_agree && !differs_from_canonical {
            let first = &versions[0];
            plan.candidates.insert(
                path,
                Candidate {
                    platform: first.platform.clone(),
                    hash: first.hash.clone(),
                },
            );
        } else {
            plan.conflicts.push(DependentConflict {
                skill: skill.to_string(),
                relative_path: path,
                canonical_hash: canonical_hash.map(ToString::to_string),
                versions,
            });
        }
    }
    plan
}

/// Result of consolidating one skill's dependent files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationOutcome {
    /// Paths written into the canonical folder.
    pub copied: Vec<String>,
    /// `platform:path` entries removed from platform folders.
    pub removed: Vec<String>,
    pub skipped: Vec<String>,
    pub conflicts: Vec<DependentConflict>,
}

/// Where one platform keeps this skill's folder.
#[derive(Debug, Clone)]
pub struct PlatformFolder {
    pub platform: String,
    pub dir: PathBuf,
}

pub struct Consolidator<'a> {
    store: &'a dyn FileStore,
    decisions: &'a mut dyn DecisionProvider,
}

impl<'a> Consolidator<'a> {
    pub fn new(store: &'a dyn FileStore, decisions: &'a mut dyn DecisionProvider) -> Self {
        Self { store, decisions }
    }

    /// Consolidate platform copies into `canonical_dir`.
    ///
    /// Returns `Flow::Abort` without touching any file when a conflict is
    /// answered with abort.
    pub fn consolidate(
        &mut self,
        skill: &str,
        canonical_dir: &Path,
        folders: &[PlatformFolder],
        canonical_files: &[DependentFile],
    ) -> Result<(Flow, ConsolidationOutcome)> {
        let mut platform_files = BTreeMap::new();
        for folder in folders {
            match scan_dependents(self.store, &folder.dir) {
                Ok(files) if files.is_empty() => {}
                Ok(files) => {
                    platform_files.insert(folder.platform.clone(), files);
                }
                Err(err) => {
                    warn!(
                        dir = %folder.dir.display(),
                        error = %err,
                        "skipping unreadable platform folder"
                    );
                }
            }
        }

        let plan = plan_consolidation(skill, &platform_files, canonical_files);
        let mut outcome = ConsolidationOutcome {
            conflicts: plan.conflicts.clone(),
            ..ConsolidationOutcome::default()
        };
        let canonical: BTreeMap<&str, &str> = canonical_files
            .iter()
            .map(|file| (file.relative_path.as_str(), file.hash.as_str()))
            .collect();

        // Resolved path -> platform to copy from (None keeps canonical's copy).
        let mut resolved: BTreeMap<String, Option<String>> = plan
            .candidates
            .iter()
            .map(|(path, candidate)| {
                let source = (canonical.get(path.as_str()) != Some(&candidate.hash.as_str()))
                    .then(|| candidate.platform.clone());
                (path.clone(), source)
            })
            .collect();

        for conflict in &plan.conflicts {
            let choice = self.decisions.resolve_dependent_conflict(conflict)?;
            if !conflict.choices().contains(&choice) {
                return Err(SyncError::ValidationFailed(format!(
                    "{skill}: {choice:?} is not a valid choice for {}",
                    conflict.relative_path
                )));
            }
            match choice {
                DependentChoice::UseCanonical => {
                    resolved.insert(conflict.relative_path.clone(), None);
                }
                DependentChoice::UsePlatform(platform) => {
                    resolved.insert(conflict.relative_path.clone(), Some(platform));
                }
                DependentChoice::Skip => {
                    debug!(skill, path = %conflict.relative_path, "skipping dependent file");
                    outcome.skipped.push(conflict.relative_path.clone());
                }
                DependentChoice::Abort => {
                    info!(skill, "dependent file pass aborted");
                    return Ok((Flow::Abort, outcome));
                }
            }
        }

        let mut consolidated = Vec::new();
        for (path, source) in &resolved {
            if let Some(platform) = source {
                let Some(folder) = folders.iter().find(|f| &f.platform == platform) else {
                    continue;
                };
                let from = folder.dir.join(path);
                let to = canonical_dir.join(path);
                if let Err(err) = self.store.copy_file(&from, &to) {
                    warn!(
                        from = %from.display(),
                        error = %err,
                        "failed to copy dependent file; leaving platform copies in place"
                    );
                    continue;
                }
                info!(skill, path = %path, platform = %platform, "consolidated dependent file");
                outcome.copied.push(path.clone());
            }
            consolidated.push(path.clone());
        }

        self.cleanup(&plan, &consolidated, folders, &mut outcome);
        Ok((Flow::Continue, outcome))
    }

    /// Remove consolidated paths from the platforms that contributed them.
    fn cleanup(
        &self,
        plan: &ConsolidationPlan,
        consolidated: &[String],
        folders: &[PlatformFolder],
        outcome: &mut ConsolidationOutcome,
    ) {
        let mut touched: BTreeSet<&str> = BTreeSet::new();
        for path in consolidated {
            let Some(contributors) = plan.contributors.get(path) else {
                continue;
            };
            for folder in folders.iter().filter(|f| contributors.contains(&f.platform)) {
                let target = folder.dir.join(path);
                match self.store.delete_file(&target) {
                    Ok(()) => {
                        debug!(path = %target.display(), "removed platform copy");
                        outcome.removed.push(format!("{}:{path}", folder.platform));
                        touched.insert(folder.platform.as_str());
                    }
                    Err(err) => {
                        warn!(
                            path = %target.display(),
                            error = %err,
                            "failed to remove platform copy"
                        );
                    }
                }
            }
        }

        for folder in folders.iter().filter(|f| touched.contains(f.platform.as_str())) {
            if let Err(err) = self.store.prune_empty_dirs(&folder.dir) {
                warn!(
                    dir = %folder.dir.display(),
                    error = %err,
                    "failed to prune empty directories"
                );
            }
        }
    }
}
