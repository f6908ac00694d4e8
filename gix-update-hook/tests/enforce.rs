//! End-to-end enforcement scenarios over a scripted repository fixture.

use std::path::{Path, PathBuf};

use gix_update_hook::{
    diff::{self, Change},
    enforce,
    walk::PairwiseWalk,
    AclRule, ChangeKind, Decision, RefUpdate,
};
use pretty_assertions::assert_eq;

const ZERO: &str = "0000000000000000000000000000000000000000";

fn fixture_dir() -> PathBuf {
    gix_testtools::scripted_fixture_read_only("push_scenarios.sh")
        .expect("fixture script should run")
}

fn repo(dir: &Path) -> gix::Repository {
    gix::discover(dir.join("course")).expect("fixture repository should open")
}

fn hex(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name))
        .expect("oid file should exist")
        .trim()
        .to_string()
}

fn oid(dir: &Path, name: &str) -> gix::ObjectId {
    gix::ObjectId::from_hex(hex(dir, name).as_bytes()).expect("valid oid")
}

fn rule(ref_pattern: &str, path_pattern: &str, allow: bool) -> AclRule {
    AclRule {
        ref_pattern: ref_pattern.to_string(),
        path_pattern: path_pattern.to_string(),
        allow,
    }
}

fn update(dir: &Path, old: &str, new: &str) -> RefUpdate {
    let old = if old == ZERO { ZERO.to_string() } else { hex(dir, old) };
    let new = if new == ZERO { ZERO.to_string() } else { hex(dir, new) };
    RefUpdate::parse("refs/heads/main", &old, &new).expect("valid update")
}

fn evaluate(dir: &Path, update: &RefUpdate, rules: &[AclRule]) -> Decision {
    enforce::evaluate(&repo(dir), update, rules, &enforce::Options::default())
        .expect("evaluation should not fail")
}

#[test]
fn docs_only_fast_forward_is_accepted() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "base.oid", "docs-only.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::Accepted);
}

#[test]
fn commit_touching_a_denied_path_is_rejected() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "base.oid", "mixed.oid");
    match evaluate(&dir, &update, &rules) {
        Decision::RejectedViolations(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "src/main.py");
            assert_eq!(violations[0].kind, ChangeKind::Modified);
            assert_eq!(violations[0].commit, hex(&dir, "mixed.oid")[..7].to_string());
        }
        other => panic!("expected a path violation, got {other:?}"),
    }
}

#[test]
fn unrestricted_access_accepts_branch_creation() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/*", "*", true)];
    let update = update(&dir, ZERO, "docs-only.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::Accepted);
}

#[test]
fn unrestricted_access_skips_force_push_detection() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/*", "*", true)];
    let update = update(&dir, "docs-only.oid", "rewritten.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::Accepted);
}

#[test]
fn restricted_access_rejects_branch_creation() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, ZERO, "docs-only.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::RejectedCreate);
}

#[test]
fn restricted_access_rejects_branch_deletion() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "docs-only.oid", ZERO);
    assert_eq!(evaluate(&dir, &update, &rules), Decision::RejectedDelete);
}

#[test]
fn history_rewrite_is_rejected() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "docs-only.oid", "rewritten.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::RejectedForcePush);
}

#[test]
fn history_rewrite_is_rejected_even_when_all_paths_are_allowed() {
    let dir = fixture_dir();
    // The denial first keeps access restricted, the catch-all after it
    // allows every path the rewrite touches; the rewrite still rejects.
    let rules = [
        rule("refs/heads/main", "ci/config.yml", false),
        rule("refs/heads/main", "*", true),
    ];
    let update = update(&dir, "docs-only.oid", "rewritten.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::RejectedForcePush);
}

#[test]
fn no_applicable_rules_reject() {
    let dir = fixture_dir();
    let rules = [rule("refs/tags/*", "*", true)];
    let update = update(&dir, "base.oid", "docs-only.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::RejectedNoAcl);
}

#[test]
fn only_the_first_offending_commit_is_reported() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "base.oid", "sources-second.oid");
    match evaluate(&dir, &update, &rules) {
        Decision::RejectedViolations(violations) => {
            // The walk starts at the tip; the older offending commit is
            // never scanned.
            let tip = hex(&dir, "sources-second.oid");
            assert!(violations.iter().all(|v| v.commit == tip[..7]));
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "src/main.py");
        }
        other => panic!("expected a path violation, got {other:?}"),
    }
}

#[test]
fn deleting_a_denied_path_is_a_violation() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "src/*", true)];
    let update = update(&dir, "docs-only.oid", "remove-docs.oid");
    match evaluate(&dir, &update, &rules) {
        Decision::RejectedViolations(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "docs/readme.md");
            assert_eq!(violations[0].kind, ChangeKind::Deleted);
        }
        other => panic!("expected a path violation, got {other:?}"),
    }
}

#[test]
fn deleting_an_allowed_path_is_fine() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "docs-only.oid", "remove-docs.oid");
    assert_eq!(evaluate(&dir, &update, &rules), Decision::Accepted);
}

#[test]
fn display_cap_bounds_collected_violations_but_still_rejects() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "docs-only.oid", "bulk.oid");
    match evaluate(&dir, &update, &rules) {
        Decision::RejectedViolations(violations) => {
            // One row past the cap is kept so the report can mark the
            // truncation; the remaining additions are never collected.
            assert_eq!(violations.len(), 11);
            assert!(violations
                .iter()
                .all(|v| v.kind == ChangeKind::Added && v.path.starts_with("generated/")));
            let report = Decision::RejectedViolations(violations)
                .render("alice", "refs/heads/main", 10);
            assert_eq!(report.lines().filter(|l| l.contains("added")).count(), 10);
            assert!(report.contains("... and more!"));
        }
        other => panic!("expected path violations, got {other:?}"),
    }
}

#[test]
fn zero_cap_collects_every_violation() {
    let dir = fixture_dir();
    let rules = [rule("refs/heads/main", "docs/*", true)];
    let update = update(&dir, "docs-only.oid", "bulk.oid");
    let options = enforce::Options {
        max_show_violations: 0,
    };
    match enforce::evaluate(&repo(&dir), &update, &rules, &options).unwrap() {
        Decision::RejectedViolations(violations) => assert_eq!(violations.len(), 15),
        other => panic!("expected path violations, got {other:?}"),
    }
}

#[test]
fn pairwise_walk_reaches_the_base() {
    let dir = fixture_dir();
    let repo = repo(&dir);
    let base = oid(&dir, "base.oid");
    let tip = oid(&dir, "docs-only.oid");
    let mut walk = PairwiseWalk::new(&repo, tip, base);
    let pairs: Vec<_> = walk.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].child, tip);
    assert_eq!(pairs[0].parent, pairs[1].child);
    assert_eq!(pairs[1].parent, base);
    assert!(walk.reached_base());
}

#[test]
fn pairwise_walk_ends_unreached_on_rewritten_history() {
    let dir = fixture_dir();
    let repo = repo(&dir);
    let base = oid(&dir, "docs-only.oid");
    let tip = oid(&dir, "rewritten.oid");
    let mut walk = PairwiseWalk::new(&repo, tip, base);
    let pairs: Vec<_> = walk.by_ref().collect::<Result<_, _>>().unwrap();
    assert!(pairs.is_empty());
    assert!(!walk.reached_base());
}

#[test]
fn changed_paths_classify_modifications_and_additions() {
    let dir = fixture_dir();
    let repo = repo(&dir);
    let changes = diff::changed_paths(&repo, oid(&dir, "base.oid"), oid(&dir, "mixed.oid")).unwrap();
    assert_eq!(
        changes,
        vec![
            Change {
                kind: ChangeKind::Modified,
                path: "docs/readme.md".into(),
            },
            Change {
                kind: ChangeKind::Modified,
                path: "src/main.py".into(),
            },
        ]
    );

    let additions =
        diff::changed_paths(&repo, oid(&dir, "docs-only.oid"), oid(&dir, "bulk.oid")).unwrap();
    assert_eq!(additions.len(), 15);
    assert!(additions
        .iter()
        .all(|c| c.kind == ChangeKind::Added && c.path.starts_with("generated/file-")));
}
