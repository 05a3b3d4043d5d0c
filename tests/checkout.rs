mod common;

use assert_fs::TempDir;
use common::{
    head_commit_id, init_repository_dir, read_file, run_strata, write_file,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn second_commit(dir: &std::path::Path) -> (String, String) {
    let first = head_commit_id(dir);

    write_file(dir, "1.txt", "uno");
    run_strata(dir, &["add", "1.txt"]).assert().success();
    run_strata(dir, &["commit", "-m", "Second"]).assert().success();

    (first, head_commit_id(dir))
}

#[rstest]
fn checking_out_a_commit_restores_byte_identical_content(init_repository_dir: TempDir) {
    let (first, second) = second_commit(init_repository_dir.path());
    assert_eq!(read_file(init_repository_dir.path(), "1.txt"), "uno");

    run_strata(init_repository_dir.path(), &["checkout", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("detached HEAD"));

    assert_eq!(read_file(init_repository_dir.path(), "1.txt"), "one");
    assert_eq!(head_commit_id(init_repository_dir.path()), first);

    run_strata(init_repository_dir.path(), &["checkout", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch 'main'"));

    assert_eq!(read_file(init_repository_dir.path(), "1.txt"), "uno");
    assert_eq!(head_commit_id(init_repository_dir.path()), second);
}

#[rstest]
fn checkout_b_creates_and_switches_to_a_branch(init_repository_dir: TempDir) {
    let head = head_commit_id(init_repository_dir.path());

    run_strata(init_repository_dir.path(), &["checkout", "-b", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created new branch 'dev'"));

    assert_eq!(
        read_file(init_repository_dir.path(), ".strata/HEAD"),
        "ref: refs/heads/dev\n"
    );
    assert_eq!(
        read_file(init_repository_dir.path(), ".strata/refs/heads/dev").trim(),
        head
    );
}

#[rstest]
fn uncommitted_changes_block_the_switch(init_repository_dir: TempDir) {
    run_strata(init_repository_dir.path(), &["branch", "dev"])
        .assert()
        .success();
    write_file(init_repository_dir.path(), "1.txt", "dirty");

    run_strata(init_repository_dir.path(), &["checkout", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("uncommitted changes"));

    run_strata(init_repository_dir.path(), &["checkout", "--force", "dev"])
        .assert()
        .success();
    assert_eq!(read_file(init_repository_dir.path(), "1.txt"), "one");
}

#[rstest]
fn checkout_clears_the_staging_area(init_repository_dir: TempDir) {
    run_strata(init_repository_dir.path(), &["branch", "dev"])
        .assert()
        .success();
    write_file(init_repository_dir.path(), "1.txt", "staged edit");
    run_strata(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_strata(init_repository_dir.path(), &["checkout", "--force", "dev"])
        .assert()
        .success();

    let index = read_file(init_repository_dir.path(), ".strata/index.json");
    assert!(index.contains("\"staged_files\": {}"));
}

#[rstest]
fn unknown_targets_are_reported(init_repository_dir: TempDir) {
    run_strata(init_repository_dir.path(), &["checkout", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch or commit 'nowhere' not found"));
}
