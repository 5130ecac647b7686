//! skillsync hash - Show a skill's canonical fingerprint

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SyncError};
use crate::store::FsStore;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Skill name
    pub skill: String,
}

pub fn run(ctx: &AppContext, args: &HashArgs) -> Result<()> {
    let set = ctx.catalog.load(&FsStore, &args.skill)?;
    let canonical = set.canonical.ok_or_else(|| {
        SyncError::SkillNotFound(format!("{}: no canonical document", args.skill))
    })?;
    let current = canonical.current_hash();
    let recorded = canonical.recorded_hash().map(ToString::to_string);
    let matches = recorded.as_deref() == Some(current.as_str());

    if ctx.robot_mode {
        return emit_robot(&robot_ok(serde_json::json!({
            "skill": args.skill,
            "current": current,
            "recorded": recorded,
            "matches": matches,
            "dependents": canonical.dependents,
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&args.skill)
        .kv("Current", &current)
        .kv("Recorded", recorded.as_deref().unwrap_or("(none)"))
        .kv("Matches", &matches.to_string())
        .kv("Dependents", &canonical.dependents.len().to_string());
    emit_human(layout);
    Ok(())
}
