//! Interactive decision provider reading single-key answers from the terminal.

use std::io::IsTerminal;

use console::{Term, style};

use crate::error::{Result, SyncError};
use crate::reconcile::{
    DecisionProvider, DependentChoice, DependentConflict, FieldConflict, MetadataChoice,
    OutOfSyncSkill, SyncAction,
};

pub struct PromptDecisions {
    term: Term,
}

impl PromptDecisions {
    /// `None` unless both stdin and stderr are terminals.
    #[must_use]
    pub fn from_terminal() -> Option<Self> {
        let term = Term::stderr();
        (term.is_term() && std::io::stdin().is_terminal()).then_some(Self { term })
    }

    fn ask<T: Clone>(&self, header: &[String], options: &[(char, String, T)]) -> Result<T> {
        self.term.write_line("")?;
        for line in header {
            self.term.write_line(line)?;
        }
        for (key, label, _) in options {
            self.term
                .write_line(&format!("  [{}] {label}", style(key).bold()))?;
        }
        loop {
            self.term.write_str("> ")?;
            let key = self.term.read_char()?;
            self.term.write_line(&key.to_string())?;
            let key = key.to_ascii_lowercase();
            if let Some((_, _, value)) = options.iter().find(|(k, _, _)| *k == key) {
                return Ok(value.clone());
            }
            self.term.write_line("unrecognized choice")?;
        }
    }
}

fn show_value(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

impl DecisionProvider for PromptDecisions {
    fn resolve_metadata_conflict(
        &mut self,
        skill: &str,
        conflict: &FieldConflict,
    ) -> Result<MetadataChoice> {
        let header = vec![
            format!(
                "{} field '{}' differs",
                style(skill).bold(),
                conflict.field
            ),
            format!("  canonical: {}", show_value(&conflict.canonical_value)),
            format!("  target:    {}", show_value(&conflict.target_value)),
        ];
        self.ask(
            &header,
            &[
                ('c', "use canonical value".to_string(), MetadataChoice::UseCanonical),
                ('t', "keep target value".to_string(), MetadataChoice::UseTarget),
                ('s', "skip remaining fields".to_string(), MetadataChoice::SkipRemaining),
            ],
        )
    }

    fn resolve_dependent_conflict(
        &mut self,
        conflict: &DependentConflict,
    ) -> Result<DependentChoice> {
        let header = vec![format!(
            "{} dependent file '{}' has conflicting versions",
            style(&conflict.skill).bold(),
            conflict.relative_path
        )];
        let mut platform_key = '1';
        let mut options = Vec::new();
        for choice in conflict.choices() {
            let (key, label) = match &choice {
                DependentChoice::UseCanonical => ('c', "keep canonical copy".to_string()),
                DependentChoice::UsePlatform(platform) => {
                    let key = platform_key;
                    platform_key = char::from_u32(u32::from(platform_key) + 1).unwrap_or('?');
                    (key, format!("use {platform} copy"))
                }
                DependentChoice::Skip => ('s', "skip this file".to_string()),
                DependentChoice::Abort => ('a', "abort dependent consolidation".to_string()),
            };
            options.push((key, label, choice));
        }
        self.ask(&header, &options)
    }

    fn resolve_out_of_sync(
        &mut self,
        skill: &OutOfSyncSkill,
        legal: &[SyncAction],
    ) -> Result<SyncAction> {
        if legal.is_empty() {
            return Err(SyncError::DecisionRequired(format!(
                "{}: no legal action for {} drift",
                skill.skill, skill.mismatch
            )));
        }
        let header = vec![format!(
            "{} {} projection is out of sync ({} differs)",
            style(&skill.skill).bold(),
            skill.platform,
            skill.mismatch
        )];
        let options: Vec<(char, String, SyncAction)> = legal
            .iter()
            .map(|action| {
                let (key, label) = match action {
                    SyncAction::KeepPlatform => ('p', format!("keep {} version", skill.platform)),
                    SyncAction::KeepCanonical => ('c', "keep canonical version".to_string()),
                    SyncAction::Abort => ('a', "abort sync".to_string()),
                };
                (key, label, *action)
            })
            .collect();
        self.ask(&header, &options)
    }
}
