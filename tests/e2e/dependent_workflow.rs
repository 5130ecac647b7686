//! E2E Scenario: dependent file consolidation
//!
//! - Files next to a platform projection move into canonical
//! - Agreeing platforms consolidate without questions
//! - Disagreeing platforms are resolved one path at a time
//! - Cleanup only touches platforms that contributed a path

use skillsync::core::{DependentFile, compute_hash, hash_bytes};
use skillsync::reconcile::{DependentChoice, StrictDecisions};
use skillsync::test_utils::{ScriptedDecisions, SkillFixture};

const RAW: &str = "---\nname: deploy\ndescription: Deploy the service\n---\nRun the deploy script\n";

#[test]
fn first_sync_moves_dependents_into_canonical() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "deploy", RAW);
    fixture.platform_file("claude", "deploy", "scripts/run.sh", "#!/bin/sh\necho deploy\n");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.dependents_copied, vec!["deploy/scripts/run.sh"]);
    assert_eq!(report.dependents_removed, vec!["claude:deploy/scripts/run.sh"]);

    assert_eq!(
        fixture.read(".agents/skills/deploy/scripts/run.sh"),
        "#!/bin/sh\necho deploy\n"
    );
    assert!(!fixture.exists(".claude/skills/deploy/scripts"));
    assert!(fixture.exists(&SkillFixture::platform_doc("claude", "deploy")));

    let canonical = fixture.document(&SkillFixture::canonical_doc("deploy"));
    let dependents = vec![DependentFile::new(
        "scripts/run.sh",
        hash_bytes(b"#!/bin/sh\necho deploy\n"),
    )];
    let expected = compute_hash(&canonical.identity(), &canonical.body, &dependents);
    assert_eq!(canonical.recorded_hash(), Some(expected.as_str()));

    for platform in ["claude", "codex"] {
        let doc = fixture.document(&SkillFixture::platform_doc(platform, "deploy"));
        assert_eq!(doc.recorded_hash(), Some(expected.as_str()), "{platform}");
    }
}

#[test]
fn agreeing_platforms_consolidate_without_questions() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "deploy", RAW);
    fixture.platform("codex", "deploy", RAW);
    fixture.platform_file("claude", "deploy", "reference.md", "same");
    fixture.platform_file("codex", "deploy", "reference.md", "same");

    let mut reconciler = fixture.reconciler(ScriptedDecisions::new());
    let report = reconciler.run(&[]).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(reconciler.decisions().dependent_questions(), 0);

    assert_eq!(fixture.read(".agents/skills/deploy/reference.md"), "same");
    assert!(!fixture.exists(".claude/skills/deploy/reference.md"));
    assert!(!fixture.exists(".codex/skills/deploy/reference.md"));
}

#[test]
fn disagreement_is_resolved_by_choosing_a_platform() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "deploy", RAW);
    fixture.platform("codex", "deploy", RAW);
    fixture.platform_file("claude", "deploy", "reference.md", "claude version");
    fixture.platform_file("codex", "deploy", "reference.md", "codex version");

    let decisions =
        ScriptedDecisions::new().with_dependent(DependentChoice::UsePlatform("codex".to_string()));
    let mut reconciler = fixture.reconciler(decisions);
    let report = reconciler.run(&[]).unwrap();
    assert!(report.failures.is_empty(), "{:?}", report.failures);

    let asked = &reconciler.decisions().dependents_asked;
    assert_eq!(asked.len(), 1);
    assert_eq!(asked[0].relative_path, "reference.md");
    assert_eq!(asked[0].canonical_hash, None);
    assert_eq!(asked[0].versions.len(), 2);

    assert_eq!(fixture.read(".agents/skills/deploy/reference.md"), "codex version");
    assert!(!fixture.exists(".claude/skills/deploy/reference.md"));
    assert!(!fixture.exists(".codex/skills/deploy/reference.md"));
}

#[test]
fn skipped_path_is_left_on_platforms() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "deploy", RAW);
    fixture.platform("codex", "deploy", RAW);
    fixture.platform_file("claude", "deploy", "reference.md", "one");
    fixture.platform_file("codex", "deploy", "reference.md", "two");
    fixture.platform_file("codex", "deploy", "notes.md", "agreed");

    let report = fixture
        .reconciler(ScriptedDecisions::new().with_dependent(DependentChoice::Skip))
        .run(&[])
        .unwrap();
    assert_eq!(report.dependents_skipped, vec!["deploy/reference.md"]);

    assert!(!fixture.exists(".agents/skills/deploy/reference.md"));
    assert_eq!(fixture.read(".claude/skills/deploy/reference.md"), "one");
    assert_eq!(fixture.read(".codex/skills/deploy/reference.md"), "two");
    assert_eq!(fixture.read(".agents/skills/deploy/notes.md"), "agreed");
    assert!(!fixture.exists(".codex/skills/deploy/notes.md"));
}

#[test]
fn canonical_copy_can_win_a_conflict() {
    let fixture = SkillFixture::new();
    fixture.canonical("deploy", RAW);
    fixture.canonical_file("deploy", "reference.md", "canonical");
    fixture.reconciler(StrictDecisions).run(&[]).unwrap();

    fixture.platform_file("claude", "deploy", "reference.md", "edited on claude");

    let mut reconciler =
        fixture.reconciler(ScriptedDecisions::new().with_dependent(DependentChoice::UseCanonical));
    reconciler.run(&[]).unwrap();
    assert_eq!(
        reconciler.decisions().dependents_asked[0].canonical_hash,
        Some(hash_bytes(b"canonical"))
    );

    assert_eq!(fixture.read(".agents/skills/deploy/reference.md"), "canonical");
    assert!(!fixture.exists(".claude/skills/deploy/reference.md"));
}

#[test]
fn cleanup_spares_canonical_only_files_and_housekeeping() {
    let fixture = SkillFixture::new();
    fixture.canonical("deploy", RAW);
    fixture.canonical_file("deploy", "notes.md", "canonical only");
    fixture.reconciler(StrictDecisions).run(&[]).unwrap();

    fixture.platform_file("claude", "deploy", "extra.md", "from claude");
    fixture.platform_file("codex", "deploy", ".git/HEAD", "ref: refs/heads/main");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.dependents_removed, vec!["claude:deploy/extra.md"]);

    assert_eq!(fixture.read(".agents/skills/deploy/notes.md"), "canonical only");
    assert_eq!(fixture.read(".agents/skills/deploy/extra.md"), "from claude");
    assert_eq!(fixture.read(".codex/skills/deploy/.git/HEAD"), "ref: refs/heads/main");
}

#[test]
fn dependent_abort_halts_dependents_but_not_skills() {
    let fixture = SkillFixture::new();
    for skill in ["alpha", "beta"] {
        fixture.platform("claude", skill, &format!("---\nname: {skill}\n---\nBody\n"));
        fixture.platform("codex", skill, &format!("---\nname: {skill}\n---\nBody\n"));
    }
    fixture.platform_file("claude", "alpha", "ref.md", "left");
    fixture.platform_file("codex", "alpha", "ref.md", "right");
    fixture.platform_file("claude", "beta", "ref.md", "agreed");

    let report = fixture
        .reconciler(ScriptedDecisions::new().with_dependent(DependentChoice::Abort))
        .run(&[])
        .unwrap();

    assert!(report.dependents_aborted);
    assert!(!report.aborted);
    assert_eq!(report.skills, vec!["alpha", "beta"]);

    assert!(!fixture.exists(".agents/skills/alpha/ref.md"));
    assert_eq!(fixture.read(".claude/skills/alpha/ref.md"), "left");
    assert!(!fixture.exists(".agents/skills/beta/ref.md"));
    assert_eq!(fixture.read(".claude/skills/beta/ref.md"), "agreed");
    assert!(fixture.document(&SkillFixture::platform_doc("claude", "beta")).is_pointer());
}

#[test]
fn strict_policy_fails_on_dependent_conflict() {
    let fixture = SkillFixture::new();
    fixture.platform("claude", "deploy", RAW);
    fixture.platform("codex", "deploy", RAW);
    fixture.platform_file("claude", "deploy", "reference.md", "one");
    fixture.platform_file("codex", "deploy", "reference.md", "two");

    let report = fixture.reconciler(StrictDecisions).run(&[]).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].code, "decision_required");
    assert_eq!(fixture.read(".claude/skills/deploy/reference.md"), "one");
}
