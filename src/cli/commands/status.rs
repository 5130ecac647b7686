//! skillsync status - Report conflicts and drift without writing

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::reconcile::{ReconcileOptions, Reconciler, SkillStatus, StrictDecisions};
use crate::store::FsStore;

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Only inspect these skills (default: all)
    #[arg(value_name = "SKILL")]
    pub skills: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let reconciler = Reconciler::new(
        FsStore,
        StrictDecisions,
        ctx.catalog.clone(),
        ReconcileOptions::default(),
    );
    let statuses = reconciler.inspect(&args.skills)?;

    if ctx.robot_mode {
        return emit_robot(&robot_ok(&statuses));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Skill Status")
        .kv("Root", &ctx.root.display().to_string())
        .kv("Canonical", &ctx.catalog.canonical_dir().display().to_string())
        .kv(
            "Platforms",
            &ctx.catalog
                .platforms()
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
        .blank();

    if statuses.is_empty() {
        layout.push_line("No skills found");
    }
    for status in &statuses {
        layout.push_line(format!("{} {}", state_label(status), status.name.bold()));
        for projection in &status.projections {
            layout.bullet(&format!("{}: {}", projection.platform, projection.form));
        }
        for platform in &status.missing_platforms {
            layout.bullet(&format!("{platform}: {}", "missing".dimmed()));
        }
        for conflict in &status.conflicts {
            layout.bullet(&format!(
                "{} vs {}: {} conflict",
                conflict.left, conflict.right, conflict.kind
            ));
        }
        for drift in &status.drift {
            layout.bullet(&format!("{}: {} drift", drift.platform, drift.mismatch));
        }
    }
    emit_human(layout);
    Ok(())
}

fn state_label(status: &SkillStatus) -> String {
    if !status.has_canonical {
        "[new]".cyan().to_string()
    } else if !status.conflicts.is_empty() || !status.drift.is_empty() {
        "[drift]".yellow().to_string()
    } else if status.in_sync() {
        "[ok]".green().to_string()
    } else {
        "[pending]".blue().to_string()
    }
}
