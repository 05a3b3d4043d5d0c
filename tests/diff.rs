mod common;

use assert_fs::TempDir;
use common::{
    head_commit_id, init_repository_dir, run_strata, stdout_of, write_bytes, write_file,
};
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn clean_tree_has_no_differences(init_repository_dir: TempDir) {
    run_strata(init_repository_dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences found"));
}

#[rstest]
fn edited_file_renders_a_unified_hunk(init_repository_dir: TempDir) {
    write_file(init_repository_dir.path(), "1.txt", "uno");

    let output = stdout_of(
        run_strata(init_repository_dir.path(), &["diff"])
            .assert()
            .success(),
    );

    assert!(output.contains("diff --strata a/1.txt b/1.txt"));
    assert!(output.contains("--- a/1.txt"));
    assert!(output.contains("+++ b/1.txt"));
    assert!(output.contains("@@"));
    assert!(output.contains("-one"));
    assert!(output.contains("+uno"));
    assert!(output.contains("+1 insertions"));
    assert!(output.contains("-1 deletions"));
}

#[rstest]
fn diff_between_two_commits_shows_the_change(init_repository_dir: TempDir) {
    let first = head_commit_id(init_repository_dir.path());
    write_file(init_repository_dir.path(), "1.txt", "uno");
    run_strata(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    run_strata(init_repository_dir.path(), &["commit", "-m", "Second"])
        .assert()
        .success();
    let second = head_commit_id(init_repository_dir.path());

    let output = stdout_of(
        run_strata(init_repository_dir.path(), &["diff", &first, &second])
            .assert()
            .success(),
    );

    assert!(output.contains(&format!("Comparing {first} -> {second}")));
    assert!(output.contains("-one"));
    assert!(output.contains("+uno"));
    assert!(output.contains("1 file(s) changed"));
}

#[rstest]
fn new_files_in_a_commit_show_as_additions(init_repository_dir: TempDir) {
    let first = head_commit_id(init_repository_dir.path());
    write_file(init_repository_dir.path(), "added.txt", "fresh\nlines\n");
    run_strata(init_repository_dir.path(), &["add", "added.txt"])
        .assert()
        .success();
    run_strata(init_repository_dir.path(), &["commit", "-m", "Add file"])
        .assert()
        .success();
    let second = head_commit_id(init_repository_dir.path());

    let output = stdout_of(
        run_strata(init_repository_dir.path(), &["diff", &first, &second])
            .assert()
            .success(),
    );

    assert!(output.contains("+++ New file: added.txt"));
    assert!(output.contains("+2 lines"));
}

#[rstest]
fn binary_files_get_a_marker_instead_of_a_line_diff(init_repository_dir: TempDir) {
    write_bytes(init_repository_dir.path(), "blob.bin", b"\x00\x01\x02data");
    run_strata(init_repository_dir.path(), &["add", "blob.bin"])
        .assert()
        .success();
    run_strata(init_repository_dir.path(), &["commit", "-m", "Binary"])
        .assert()
        .success();

    write_bytes(init_repository_dir.path(), "blob.bin", b"\x00\x01\x03data");

    let output = stdout_of(
        run_strata(init_repository_dir.path(), &["diff"])
            .assert()
            .success(),
    );

    assert!(output.contains("Binary files a/blob.bin and b/blob.bin differ"));
    assert!(!output.contains("@@"));
}

#[rstest]
fn cached_diff_compares_the_stage_against_head(init_repository_dir: TempDir) {
    write_file(init_repository_dir.path(), "1.txt", "staged version");
    run_strata(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    // A later unstaged edit must not leak into the cached diff's file set.
    write_file(init_repository_dir.path(), "a/2.txt", "unstaged edit");

    let output = stdout_of(
        run_strata(init_repository_dir.path(), &["diff", "--cached"])
            .assert()
            .success(),
    );

    assert!(output.contains("+staged version"));
    assert!(!output.contains("a/2.txt"));
}

#[rstest]
fn unknown_commit_ids_fail(init_repository_dir: TempDir) {
    run_strata(init_repository_dir.path(), &["diff", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
