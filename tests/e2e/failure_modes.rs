//! E2E Scenario: per-skill failures and metadata conflicts
//!
//! - A broken skill is reported and the batch moves on
//! - fail-fast surfaces the first failure as an error
//! - Identity conflicts go through the decision provider
//! - Divergent raw content is never silently overwritten

use skillsync::reconcile::{MetadataChoice, ReconcileOptions, Reconciler, StrictDecisions};
use skillsync::store::FsStore;
use skillsync::test_utils::{ScriptedDecisions, SkillFixture};

#[test]
fn corrupt_canonical_fails_only_that_skill() {
    let fixture = SkillFixture::new();
    fixture.canonical("broken", "---\nname: [unclosed\n---\nBody\n");
    fixture.platform("claude", "healthy", "---\nname: healthy\n---\nFine\n");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].skill, "broken");
    assert_eq!(report.failures[0].code, "invalid_document");
    assert_eq!(report.skills, vec!["healthy"]);
    assert!(fixture.exists(&SkillFixture::canonical_doc("healthy")));
    assert!(!fixture.exists(&SkillFixture::platform_doc("claude", "broken")));
}

#[test]
fn fail_fast_returns_first_error() {
    let fixture = SkillFixture::new();
    fixture.canonical("broken", "---\nname: [unclosed\n---\nBody\n");
    fixture.platform("claude", "later", "---\nname: later\n---\nFine\n");

    let mut reconciler = Reconciler::new(
        FsStore,
        StrictDecisions,
        fixture.catalog(),
        ReconcileOptions { fail_fast: true },
    );
    let err = reconciler.run(&[]).unwrap_err();
    assert_eq!(err.code(), "invalid_document");
    assert!(!fixture.exists(&SkillFixture::canonical_doc("later")));
}

#[test]
fn pointer_without_canonical_is_reported() {
    let fixture = SkillFixture::new();
    fixture.platform(
        "claude",
        "ghost",
        "---\nname: ghost\n---\n@../../../.agents/skills/ghost/SKILL.md\n",
    );

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].code, "skill_not_found");
    assert!(!fixture.exists(&SkillFixture::canonical_doc("ghost")));
}

#[test]
fn identity_conflict_is_resolved_by_decision() {
    let fixture = SkillFixture::new();
    fixture.canonical(
        "review",
        "---\nname: review\ndescription: Canonical text\nallowed-tools: [Read]\n---\nBody\n",
    );
    fixture.platform(
        "claude",
        "review",
        "---\nname: review\ndescription: Platform text\nallowed-tools: [Bash]\n---\n@../../../.agents/skills/review/SKILL.md\n",
    );

    let mut reconciler =
        fixture.reconciler(ScriptedDecisions::new().with_metadata(MetadataChoice::UseTarget));
    let report = reconciler.run(&[]).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);

    let asked = &reconciler.decisions().metadata_asked;
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].0, "review");
    assert_eq!(asked[0].1.field, "description");

    let claude = fixture.document(&SkillFixture::platform_doc("claude", "review"));
    assert_eq!(
        claude.frontmatter.get("description").and_then(|v| v.as_str()),
        Some("Platform text")
    );
    let tools: Vec<&str> = claude.frontmatter["allowed-tools"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(tools, vec!["Bash", "Read"]);
    let canonical = fixture.document(&SkillFixture::canonical_doc("review"));
    assert_eq!(claude.recorded_hash(), canonical.recorded_hash());
}

#[test]
fn strict_identity_conflict_fails_skill() {
    let fixture = SkillFixture::new();
    fixture.canonical("review", "---\nname: review\ndescription: Canonical text\n---\nBody\n");
    fixture.platform(
        "claude",
        "review",
        "---\nname: review\ndescription: Platform text\n---\n@../../../.agents/skills/review/SKILL.md\n",
    );

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].code, "conflict_unresolved");
}

#[test]
fn divergent_raw_projection_is_not_overwritten_without_history() {
    let fixture = SkillFixture::new();
    fixture.canonical("review", "---\nname: review\n---\nCanonical body\n");
    let raw = "---\nname: review\n---\nPlatform body\n";
    fixture.platform("claude", "review", raw);

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert!(report.failures.is_empty());
    assert!(report.drift.is_empty());
    assert_eq!(fixture.read(&SkillFixture::platform_doc("claude", "review")), raw);
    assert!(fixture.document(&SkillFixture::platform_doc("codex", "review")).is_pointer());
}

#[test]
fn unreadable_projection_is_skipped() {
    let fixture = SkillFixture::new();
    fixture.canonical("review", "---\nname: review\n---\nBody\n");
    let broken = "---\nname: [unclosed\n---\nBody\n";
    fixture.platform("claude", "review", broken);

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(fixture.read(&SkillFixture::platform_doc("claude", "review")), broken);
    assert!(fixture.document(&SkillFixture::platform_doc("codex", "review")).is_pointer());
}

fn pointer_with_description(skill: &str, description: &str) -> String {
    format!(
        "---\nname: {skill}\ndescription: {description}\n---\n@../../../.agents/skills/{skill}/SKILL.md\n"
    )
}

#[test]
fn skip_remaining_covers_every_projection_of_the_skill() {
    let fixture = SkillFixture::new();
    for skill in ["alpha", "beta"] {
        fixture.canonical(
            skill,
            &format!("---\nname: {skill}\ndescription: Canonical\n---\nBody\n"),
        );
    }
    fixture.platform("claude", "alpha", &pointer_with_description("alpha", "Claude text"));
    fixture.platform("codex", "alpha", &pointer_with_description("alpha", "Codex text"));
    fixture.platform("claude", "beta", &pointer_with_description("beta", "Claude text"));

    let decisions = ScriptedDecisions::new()
        .with_metadata(MetadataChoice::SkipRemaining)
        .with_metadata(MetadataChoice::UseCanonical);
    let mut reconciler = fixture.reconciler(decisions);
    let report = reconciler.run(&[]).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);

    let asked = &reconciler.decisions().metadata_asked;
    assert_eq!(asked.len(), 2);
    assert_eq!(asked[0].0, "alpha");
    assert_eq!(asked[1].0, "beta");

    let description = |platform: &str, skill: &str| {
        fixture
            .document(&SkillFixture::platform_doc(platform, skill))
            .frontmatter
            .get("description")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
    };
    assert_eq!(description("claude", "alpha").as_deref(), Some("Claude text"));
    assert_eq!(description("codex", "alpha").as_deref(), Some("Codex text"));
    assert_eq!(description("claude", "beta").as_deref(), Some("Canonical"));

    let canonical = fixture.document(&SkillFixture::canonical_doc("alpha"));
    for platform in ["claude", "codex"] {
        let doc = fixture.document(&SkillFixture::platform_doc(platform, "alpha"));
        assert_eq!(doc.recorded_hash(), canonical.recorded_hash(), "{platform}");
    }
}
