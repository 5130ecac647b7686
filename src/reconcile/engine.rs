//! Reconciliation pass over every known skill.
//!
//! Skills are processed one at a time in lexicographic order. For each skill
//! the pass runs: extraction (first sight of a raw projection), pairwise
//! conflict reporting, drift resolution, dependent-file consolidation,
//! canonical rehash, and propagation of canonical to every enabled platform.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::hash::mappings_equal;
use crate::core::{Document, DocumentForm, bodies_equal, build_pointer};
use crate::error::{Result, SyncError};
use crate::store::{FileStore, SkillCatalog};

use super::conflict::{PairConflict, detect_conflicts};
use super::decision::{DecisionProvider, SyncAction};
use super::dependents::{Consolidator, DependentConflict, PlatformFolder};
use super::drift::{Mismatch, OutOfSyncSkill, detect_drift};
use super::merge::merge_resolved;
use super::model::{CanonicalSkill, Projection};
use super::resolution::{adopt_platform, legal_actions, regenerate_projection};

/// Whether the batch keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Stop the batch on the first failed skill instead of recording it.
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedResolution {
    pub skill: String,
    pub platform: String,
    pub mismatch: Mismatch,
    pub action: SyncAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFailure {
    pub skill: String,
    pub code: String,
    pub message: String,
}

impl SkillFailure {
    fn new(skill: &str, err: &SyncError) -> Self {
        Self {
            skill: skill.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Skills whose pass ran to completion (or to an abort decision).
    pub skills: Vec<String>,
    /// Skills whose canonical document was created in this pass.
    pub created: Vec<String>,
    /// `platform:skill` projections created in this pass.
    pub linked: Vec<String>,
    /// `platform:skill` (or `canonical:skill`) documents rewritten.
    pub updated: Vec<String>,
    pub conflicts: Vec<PairConflict>,
    pub drift: Vec<OutOfSyncSkill>,
    pub resolutions: Vec<AppliedResolution>,
    /// `skill/path` dependent files copied into canonical.
    pub dependents_copied: Vec<String>,
    /// `platform:skill/path` dependent files removed from platforms.
    pub dependents_removed: Vec<String>,
    pub dependents_skipped: Vec<String>,
    pub dependent_conflicts: Vec<DependentConflict>,
    pub failures: Vec<SkillFailure>,
    pub aborted: bool,
    pub dependents_aborted: bool,
}

impl SyncReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionStatus {
    pub platform: String,
    pub form: String,
    pub recorded_hash: Option<String>,
}

/// Read-only view of one skill, produced by [`Reconciler::inspect`].
#[derive(Debug, Clone, Serialize)]
pub struct SkillStatus {
    pub name: String,
    pub has_canonical: bool,
    pub recorded_hash: Option<String>,
    pub current_hash: Option<String>,
    pub projections: Vec<ProjectionStatus>,
    pub missing_platforms: Vec<String>,
    pub conflicts: Vec<PairConflict>,
    pub drift: Vec<OutOfSyncSkill>,
}

impl SkillStatus {
    #[must_use]
    pub fn in_sync(&self) -> bool {
        self.has_canonical
            && self.recorded_hash == self.current_hash
            && self.missing_platforms.is_empty()
            && self.conflicts.is_empty()
            && self.drift.is_empty()
            && self
                .projections
                .iter()
                .all(|p| p.form == "pointer" && p.recorded_hash == self.recorded_hash)
    }
}

pub struct Reconciler<S, D> {
    store: S,
    decisions: D,
    catalog: SkillCatalog,
    options: ReconcileOptions,
    /// Set by a `skip-remaining` metadata answer; cleared per skill.
    skip_metadata: bool,
}

impl<S: FileStore, D: DecisionProvider> Reconciler<S, D> {
    pub const fn new(
        store: S,
        decisions: D,
        catalog: SkillCatalog,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            store,
            decisions,
            catalog,
            options,
            skip_metadata: false,
        }
    }

    pub const fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub const fn decisions(&self) -> &D {
        &self.decisions
    }

    /// Reconcile every known skill, or only `only` when non-empty.
    pub fn run(&mut self, only: &[String]) -> Result<SyncReport> {
        let names = self.selected_names(only)?;
        let mut report = SyncReport::default();

        for name in names {
            match self.reconcile_skill(&name, &mut report) {
                Ok(Flow::Continue) => report.skills.push(name),
                Ok(Flow::Abort) => {
                    info!(skill = %name, "sync aborted; remaining skills left untouched");
                    report.skills.push(name);
                    report.aborted = true;
                    break;
                }
                Err(err) => {
                    if self.options.fail_fast {
                        return Err(err);
                    }
                    warn!(skill = %name, error = %err, "skill reconciliation failed");
                    report.failures.push(SkillFailure::new(&name, &err));
                }
            }
        }
        Ok(report)
    }

    /// Detection only: report conflicts, drift and hashes without writing.
    pub fn inspect(&self, only: &[String]) -> Result<Vec<SkillStatus>> {
        let names = self.selected_names(only)?;
        let mut statuses = Vec::with_capacity(names.len());
        for name in names {
            let set = self.catalog.load(&self.store, &name)?;
            let conflicts = detect_conflicts(&name, &set.projections);
            let drift = set.canonical.as_ref().map_or_else(Vec::new, |canonical| {
                set.projections
                    .iter()
                    .filter_map(|projection| detect_drift(&name, projection, canonical))
                    .collect()
            });
            let projections = set
                .projections
                .iter()
                .map(|p| ProjectionStatus {
                    platform: p.platform.clone(),
                    form: match p.document.form() {
                        DocumentForm::Pointer => "pointer".to_string(),
                        DocumentForm::Raw => "raw".to_string(),
                    },
                    recorded_hash: p.document.recorded_hash().map(ToString::to_string),
                })
                .collect();
            let missing_platforms = self
                .catalog
                .platforms()
                .iter()
                .filter(|platform| !set.projections.iter().any(|p| p.platform == platform.name))
                .map(|platform| platform.name.clone())
                .collect();

            statuses.push(SkillStatus {
                has_canonical: set.canonical.is_some(),
                recorded_hash: set
                    .canonical
                    .as_ref()
                    .and_then(|c| c.recorded_hash().map(ToString::to_string)),
                current_hash: set.canonical.as_ref().map(CanonicalSkill::current_hash),
                projections,
                missing_platforms,
                conflicts,
                drift,
                name,
            });
        }
        Ok(statuses)
    }

    fn selected_names(&self, only: &[String]) -> Result<Vec<String>> {
        if only.is_empty() {
            return Ok(self.catalog.skill_names(&self.store)?.into_iter().collect());
        }
        self.catalog.ensure_known(&self.store, only)?;
        let mut names = only.to_vec();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn reconcile_skill(&mut self, name: &str, report: &mut SyncReport) -> Result<Flow> {
        self.skip_metadata = false;
        let set = self.catalog.load(&self.store, name)?;
        let mut projections = set.projections;

        let conflicts = detect_conflicts(name, &projections);
        for conflict in &conflicts {
            debug!(
                skill = name,
                left = %conflict.left,
                right = %conflict.right,
                kind = %conflict.kind,
                "projections disagree"
            );
        }
        report.conflicts.extend(conflicts);

        let mut canonical = match set.canonical {
            Some(canonical) => canonical,
            None => self.extract_canonical(name, set.canonical_path, &mut projections, report)?,
        };

        if self.resolve_drift(name, &mut canonical, &mut projections, report)? == Flow::Abort {
            return Ok(Flow::Abort);
        }

        if !report.dependents_aborted {
            self.consolidate_dependents(name, &mut canonical, &projections, report)?;
        }

        if canonical.refresh_hash() {
            self.store.write_document(&canonical.path, &canonical.document)?;
            info!(skill = name, hash = ?canonical.recorded_hash(), "canonical hash updated");
            report.updated.push(format!("canonical:{name}"));
        }

        self.propagate(name, &canonical, &mut projections, &set.unreadable, report)?;
        Ok(Flow::Continue)
    }

    /// Create canonical from the first raw projection, in platform order.
    fn extract_canonical(
        &self,
        name: &str,
        path: std::path::PathBuf,
        projections: &mut [Projection],
        report: &mut SyncReport,
    ) -> Result<CanonicalSkill> {
        let Some(source) = projections
            .iter()
            .position(|p| p.document.form() == DocumentForm::Raw)
        else {
            return Err(SyncError::SkillNotFound(format!(
                "{name}: no canonical document and no raw projection to extract from"
            )));
        };

        let canonical = CanonicalSkill::extract(name, path, &projections[source].document);
        self.store.write_document(&canonical.path, &canonical.document)?;
        info!(skill = name, platform = %projections[source].platform, "created canonical document");
        report.created.push(name.to_string());

        let projection = &mut projections[source];
        let document =
            regenerate_projection(Some(&projection.document), &projection.path, &canonical);
        self.write_projection(name, projection, document, report)?;
        Ok(canonical)
    }

    fn resolve_drift(
        &mut self,
        name: &str,
        canonical: &mut CanonicalSkill,
        projections: &mut [Projection],
        report: &mut SyncReport,
    ) -> Result<Flow> {
        for idx in 0..projections.len() {
            let Some(out_of_sync) = detect_drift(name, &projections[idx], canonical) else {
                continue;
            };
            report.drift.push(out_of_sync.clone());

            let legal = legal_actions(&out_of_sync);
            let action = self.decisions.resolve_out_of_sync(&out_of_sync, &legal)?;
            if !legal.contains(&action) {
                return Err(SyncError::ValidationFailed(format!(
                    "{name}: {action} is not allowed for {} drift on {}",
                    out_of_sync.mismatch, out_of_sync.platform
                )));
            }
            debug!(skill = name, platform = %out_of_sync.platform, %action, "resolving drift");
            report.resolutions.push(AppliedResolution {
                skill: name.to_string(),
                platform: out_of_sync.platform.clone(),
                mismatch: out_of_sync.mismatch,
                action,
            });

            match action {
                SyncAction::Abort => return Ok(Flow::Abort),
                SyncAction::KeepCanonical => {
                    let projection = &mut projections[idx];
                    let document = regenerate_projection(
                        Some(&projection.document),
                        &projection.path,
                        canonical,
                    );
                    self.write_projection(name, projection, document, report)?;
                }
                SyncAction::KeepPlatform => {
                    self.keep_platform(name, canonical, projections, idx, report)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Promote projection `idx` to canonical and carry the change to the others.
    fn keep_platform(
        &mut self,
        name: &str,
        canonical: &mut CanonicalSkill,
        projections: &mut [Projection],
        idx: usize,
        report: &mut SyncReport,
    ) -> Result<()> {
        let previous = canonical.clone();
        adopt_platform(canonical, &projections[idx]);
        self.store.write_document(&canonical.path, &canonical.document)?;
        info!(
            skill = name,
            platform = %projections[idx].platform,
            "canonical updated from platform"
        );
        report.updated.push(format!("canonical:{name}"));

        for other in 0..projections.len() {
            let projection = &mut projections[other];
            let document = if other == idx
                || detect_drift(name, projection, &previous).is_none()
            {
                regenerate_projection(Some(&projection.document), &projection.path, canonical)
            } else {
                let merged = merge_resolved(
                    name,
                    &canonical.document.frontmatter,
                    &projection.document.frontmatter,
                    &mut self.decisions,
                    &mut self.skip_metadata,
                )?;
                Document::new(merged, projection.document.body.clone())
            };
            self.write_projection(name, projection, document, report)?;
        }
        Ok(())
    }

    fn consolidate_dependents(
        &mut self,
        name: &str,
        canonical: &mut CanonicalSkill,
        projections: &[Projection],
        report: &mut SyncReport,
    ) -> Result<()> {
        let folders: Vec<PlatformFolder> = projections
            .iter()
            .map(|projection| PlatformFolder {
                platform: projection.platform.clone(),
                dir: projection.skill_dir(),
            })
            .collect();
        let canonical_dir = canonical.skill_dir();

        let (flow, outcome) = Consolidator::new(&self.store, &mut self.decisions).consolidate(
            name,
            &canonical_dir,
            &folders,
            &canonical.dependents,
        )?;

        report
            .dependents_copied
            .extend(outcome.copied.iter().map(|path| format!("{name}/{path}")));
        report.dependents_removed.extend(outcome.removed.iter().map(|entry| {
            entry
                .split_once(':')
                .map_or_else(
                    || entry.clone(),
                    |(platform, path)| format!("{platform}:{name}/{path}"),
                )
        }));
        report
            .dependents_skipped
            .extend(outcome.skipped.iter().map(|path| format!("{name}/{path}")));
        report.dependent_conflicts.extend(outcome.conflicts);

        if flow == Flow::Abort {
            report.dependents_aborted = true;
            return Ok(());
        }
        canonical.dependents = crate::store::scan_dependents(&self.store, &canonical_dir)?;
        Ok(())
    }

    /// Bring every enabled platform in line with canonical.
    fn propagate(
        &mut self,
        name: &str,
        canonical: &CanonicalSkill,
        projections: &mut Vec<Projection>,
        unreadable: &[String],
        report: &mut SyncReport,
    ) -> Result<()> {
        let platforms = self.catalog.platforms().to_vec();
        for platform in &platforms {
            if unreadable.contains(&platform.name) {
                debug!(
                    skill = name,
                    platform = %platform.name,
                    "leaving unreadable projection alone"
                );
                continue;
            }
            let Some(idx) = projections.iter().position(|p| p.platform == platform.name) else {
                let path = platform.doc_path(name);
                let document = regenerate_projection(None, &path, canonical);
                self.store.write_document(&path, &document)?;
                info!(skill = name, platform = %platform.name, "linked platform to canonical");
                report.linked.push(format!("{}:{name}", platform.name));
                projections.push(Projection {
                    platform: platform.name.clone(),
                    path,
                    document,
                });
                continue;
            };

            let projection = &mut projections[idx];
            let document = match projection.document.form() {
                DocumentForm::Raw => {
                    if !raw_matches(projection, canonical) {
                        warn!(
                            skill = name,
                            platform = %platform.name,
                            "raw projection differs from canonical; left for the next pass"
                        );
                        continue;
                    }
                    regenerate_projection(Some(&projection.document), &projection.path, canonical)
                }
                DocumentForm::Pointer => {
                    let merged = merge_resolved(
                        name,
                        &canonical.document.frontmatter,
                        &projection.document.frontmatter,
                        &mut self.decisions,
                        &mut self.skip_metadata,
                    )?;
                    let expected = build_pointer(&projection.path, &canonical.path);
                    let body = if projection.document.pointer() == Some(expected.as_str()) {
                        projection.document.body.clone()
                    } else {
                        format!("{expected}\n")
                    };
                    Document::new(merged, body)
                }
            };
            self.write_projection(name, projection, document, report)?;
        }
        Ok(())
    }

    fn write_projection(
        &self,
        name: &str,
        projection: &mut Projection,
        document: Document,
        report: &mut SyncReport,
    ) -> Result<()> {
        if document == projection.document {
            return Ok(());
        }
        self.store.write_document(&projection.path, &document)?;
        info!(skill = name, platform = %projection.platform, "updated projection");
        report.updated.push(format!("{}:{name}", projection.platform));
        projection.document = document;
        Ok(())
    }
}

/// A raw projection carrying exactly canonical's content can become a pointer
/// without losing anything.
fn raw_matches(projection: &Projection, canonical: &CanonicalSkill) -> bool {
    bodies_equal(&projection.document.body, &canonical.document.body)
        && mappings_equal(&projection.document.identity(), &canonical.document.identity())
}
