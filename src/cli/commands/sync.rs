//! skillsync sync - Reconcile canonical and platform skill copies

use clap::Args;
use colored::Colorize;
use tracing::warn;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, RobotStatus, emit_human, emit_robot, robot_ok};
use crate::cli::prompt::PromptDecisions;
use crate::config::SyncPolicy;
use crate::error::{Result, SyncError};
use crate::reconcile::{
    DecisionProvider, KeepCanonicalDecisions, ReconcileOptions, Reconciler, StrictDecisions,
    SyncReport,
};
use crate::store::FsStore;

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Only reconcile these skills (default: all)
    #[arg(value_name = "SKILL")]
    pub skills: Vec<String>,

    /// Decision policy: interactive, strict, keep-canonical
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<SyncPolicy>,

    /// Stop at the first skill that fails
    #[arg(long)]
    pub fail_fast: bool,
}

fn parse_policy(value: &str) -> std::result::Result<SyncPolicy, String> {
    SyncPolicy::parse(value).map_err(|err| err.to_string())
}

pub fn run(ctx: &AppContext, args: &SyncArgs) -> Result<()> {
    let policy = args.policy.unwrap_or_else(|| ctx.config.effective_policy());
    let options = ReconcileOptions {
        fail_fast: args.fail_fast || ctx.config.sync.fail_fast,
    };
    let decisions = decisions_for(policy, ctx.robot_mode);
    let mut reconciler = Reconciler::new(FsStore, decisions, ctx.catalog.clone(), options);
    let report = reconciler.run(&args.skills)?;

    if ctx.robot_mode {
        let mut response = robot_ok(&report);
        response.warnings = report
            .conflicts
            .iter()
            .map(|c| format!("{}: {} and {} disagree ({})", c.skill, c.left, c.right, c.kind))
            .collect();
        if report.aborted {
            response.status = RobotStatus::Error {
                code: "aborted".to_string(),
                message: "sync aborted; remaining skills left untouched".to_string(),
            };
        } else if report.has_failures() {
            response.status = RobotStatus::Partial {
                completed: report.skills.len(),
                failed: report.failures.len(),
            };
        }
        emit_robot(&response)?;
    } else {
        emit_human(human_report(policy, &report));
    }

    if report.aborted {
        return Err(SyncError::Aborted(
            "remaining skills left untouched".to_string(),
        ));
    }
    if report.has_failures() {
        return Err(SyncError::SkillsFailed {
            failed: report.failures.len(),
        });
    }
    Ok(())
}

fn decisions_for(policy: SyncPolicy, robot_mode: bool) -> Box<dyn DecisionProvider> {
    match policy {
        SyncPolicy::Strict => Box::new(StrictDecisions),
        SyncPolicy::KeepCanonical => Box::new(KeepCanonicalDecisions),
        SyncPolicy::Interactive => match PromptDecisions::from_terminal() {
            Some(prompt) if !robot_mode => Box::new(prompt),
            _ => {
                warn!("no interactive terminal; decisions fall back to strict");
                Box::new(StrictDecisions)
            }
        },
    }
}

fn human_report(policy: SyncPolicy, report: &SyncReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .title("Sync Report")
        .kv("Policy", policy.label())
        .kv("Skills", &report.skills.len().to_string())
        .kv("Created", &report.created.len().to_string())
        .kv("Linked", &report.linked.len().to_string())
        .kv("Updated", &report.updated.len().to_string())
        .kv("Dependents copied", &report.dependents_copied.len().to_string())
        .kv("Dependents removed", &report.dependents_removed.len().to_string());

    if !report.conflicts.is_empty() {
        layout.blank().section("Conflicts");
        for conflict in &report.conflicts {
            layout.bullet(&format!(
                "{}: {} vs {} ({})",
                conflict.skill, conflict.left, conflict.right, conflict.kind
            ));
        }
    }

    if !report.resolutions.is_empty() {
        layout.blank().section("Drift");
        for resolution in &report.resolutions {
            layout.bullet(&format!(
                "{}:{} {} drift -> {}",
                resolution.platform, resolution.skill, resolution.mismatch, resolution.action
            ));
        }
    }

    if !report.dependents_skipped.is_empty() || !report.dependent_conflicts.is_empty() {
        layout.blank().section("Dependent files");
        for conflict in &report.dependent_conflicts {
            let platforms: Vec<&str> = conflict
                .versions
                .iter()
                .map(|v| v.platform.as_str())
                .collect();
            layout.bullet(&format!(
                "{}/{} conflicted across {}",
                conflict.skill,
                conflict.relative_path,
                platforms.join(", ")
            ));
        }
        for skipped in &report.dependents_skipped {
            layout.bullet(&format!("{skipped} skipped"));
        }
    }

    if !report.failures.is_empty() {
        layout.blank().section("Failures");
        for failure in &report.failures {
            layout.bullet(&format!("{} {}: {}", "✗".red(), failure.skill, failure.message));
        }
    }

    if report.aborted {
        layout
            .blank()
            .push_line(format!("{}", "Aborted; remaining skills left untouched".yellow()));
    } else if report.failures.is_empty() {
        layout.blank().push_line(format!("{} Sync complete", "✓".green().bold()));
    }
    layout
}
