//! E2E Scenario: first sight of a skill and steady state
//!
//! - Raw projection with no canonical is extracted and linked
//! - Missing platforms get a pointer-form projection
//! - A second pass writes nothing
//! - Pairwise conflicts ignore platform-private fields

use skillsync::core::{Document, compute_hash};
use skillsync::reconcile::StrictDecisions;
use skillsync::test_utils::SkillFixture;

const REVIEW_RAW: &str = "---\nname: review\ndescription: Review code\nmodel: opus\n---\nCheck code quality\n";

fn recorded_hash(doc: &Document) -> String {
    doc.recorded_hash().expect("bookkeeping hash").to_string()
}

#[test]
fn raw_projection_is_extracted_into_canonical() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "review", REVIEW_RAW);

    let mut reconciler = fixture.reconciler(StrictDecisions);
    let report = reconciler.run(&[]).unwrap();

    assert_eq!(report.created, vec!["review"]);
    assert_eq!(report.linked, vec!["codex:review"]);
    assert!(report.failures.is_empty());

    let canonical = fixture.document(&SkillFixture::canonical_doc("review"));
    assert_eq!(canonical.body, "Check code quality\n");
    assert!(!canonical.frontmatter.contains_key("model"));

    let expected = compute_hash(&canonical.identity(), "Check code quality\n", &[]);
    assert_eq!(recorded_hash(&canonical), expected);

    let claude = fixture.document(&SkillFixture::platform_doc("claude", "review"));
    assert_eq!(claude.pointer(), Some("@../../../.agents/skills/review/SKILL.md"));
    assert_eq!(recorded_hash(&claude), expected);
    assert_eq!(
        claude.frontmatter.get("model").and_then(|v| v.as_str()),
        Some("opus")
    );

    let codex = fixture.document(&SkillFixture::platform_doc("codex", "review"));
    assert!(codex.is_pointer());
    assert_eq!(recorded_hash(&codex), expected);
    assert_eq!(codex.name(), Some("review"));
}

#[test]
fn canonical_records_schema_version() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "review", REVIEW_RAW);
    fixture.reconciler(StrictDecisions).run(&[]).unwrap();

    let raw = fixture.read(&SkillFixture::canonical_doc("review"));
    assert!(raw.contains("skillsync:"));
    assert!(raw.contains("version: 1"));

    let claude = fixture.read(&SkillFixture::platform_doc("claude", "review"));
    assert!(!claude.contains("version:"));
}

#[test]
fn second_pass_changes_nothing() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "review", REVIEW_RAW);
    fixture.reconciler(StrictDecisions).run(&[]).unwrap();

    let before_canonical = fixture.read(&SkillFixture::canonical_doc("review"));
    let before_codex = fixture.read(&SkillFixture::platform_doc("codex", "review"));

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert!(report.created.is_empty());
    assert!(report.linked.is_empty());
    assert!(report.updated.is_empty(), "unexpected writes: {:?}", report.updated);
    assert!(report.drift.is_empty());

    assert_eq!(fixture.read(&SkillFixture::canonical_doc("review")), before_canonical);
    assert_eq!(fixture.read(&SkillFixture::platform_doc("codex", "review")), before_codex);
}

#[test]
fn private_field_difference_is_not_a_conflict() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "review", REVIEW_RAW);
    fixture.reconciler(StrictDecisions).run(&[]).unwrap();

    let pointer = "@../../../.agents/skills/review/SKILL.md";
    fixture.platform(
        "codex",
        "review",
        &format!("---\nname: review\ndescription: Review code\nmodel: gpt\n---\n{pointer}\n"),
    );

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert!(report.conflicts.is_empty());
    assert!(report.failures.is_empty());

    let codex = fixture.document(&SkillFixture::platform_doc("codex", "review"));
    assert_eq!(codex.frontmatter.get("model").and_then(|v| v.as_str()), Some("gpt"));
}

#[test]
fn canonical_only_skill_is_linked_everywhere() {
    let fixture = SkillFixture::new();
    fixture.canonical("lint", "---\nname: lint\ndescription: Lint code\n---\nRun the linter\n");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.linked, vec!["claude:lint", "codex:lint"]);
    assert_eq!(report.updated, vec!["canonical:lint"]);

    let canonical = fixture.document(&SkillFixture::canonical_doc("lint"));
    let claude = fixture.document(&SkillFixture::platform_doc("claude", "lint"));
    assert_eq!(claude.recorded_hash(), canonical.recorded_hash());
}

#[test]
fn skills_are_processed_in_name_order() {
    let fixture = SkillFixture::new();
    fixture.platform("codex", "zeta", "---\nname: zeta\n---\nZ\n");
    fixture.platform("claude", "alpha", "---\nname: alpha\n---\nA\n");
    fixture.platform("claude", "mid", "---\nname: mid\n---\nM\n");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.skills, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn run_can_be_restricted_to_named_skills() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "alpha", "---\nname: alpha\n---\nA\n");
    fixture.platform("claude", "beta", "---\nname: beta\n---\nB\n");

    let report = fixture
        .reconciler(StrictDecisions)
        .run(&["beta".to_string()])
        .unwrap();
    assert_eq!(report.skills, vec!["beta"]);
    assert!(!fixture.exists(&SkillFixture::canonical_doc("alpha")));

    let err = fixture
        .reconciler(StrictDecisions)
        .run(&["missing".to_string()])
        .unwrap_err();
    assert_eq!(err.code(), "skill_not_found");
}

#[test]
fn one_line_mention_body_is_extracted_as_content() {
    let fixture = SkillFixture::new();
    fixture.platform(
        "claude",
        "notify",
        "---\nname: notify\n---\n@channel please review the PR\n",
    );

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.created, vec!["notify"]);

    let canonical = fixture.document(&SkillFixture::canonical_doc("notify"));
    assert_eq!(canonical.body, "@channel please review the PR\n");
    let claude = fixture.document(&SkillFixture::platform_doc("claude", "notify"));
    assert_eq!(
        claude.pointer(),
        Some("@../../../.agents/skills/notify/SKILL.md")
    );
}
