mod common;

use assert_fs::TempDir;
use common::{
    head_commit_id, init_repository_dir, read_file, repository_dir, run_strata, write_file,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn commit_snapshots_files_with_directory_structure(init_repository_dir: TempDir) {
    let id = head_commit_id(init_repository_dir.path());

    let meta = read_file(
        init_repository_dir.path(),
        &format!(".strata/commits/{id}/meta.json"),
    );
    assert!(meta.contains("Initial commit"));
    assert!(meta.contains("a/b/3.txt"));

    assert_eq!(
        read_file(init_repository_dir.path(), &format!(".strata/commits/{id}/1.txt")),
        "one"
    );
    assert_eq!(
        read_file(
            init_repository_dir.path(),
            &format!(".strata/commits/{id}/a/b/3.txt")
        ),
        "three"
    );
}

#[rstest]
fn commit_updates_head_and_branch_ref_to_the_same_id(init_repository_dir: TempDir) {
    let id = head_commit_id(init_repository_dir.path());
    let branch_ref = read_file(init_repository_dir.path(), ".strata/refs/heads/main");

    assert_eq!(branch_ref.trim(), id);

    let meta = read_file(
        init_repository_dir.path(),
        &format!(".strata/commits/{id}/meta.json"),
    );
    assert!(meta.contains(&format!("\"id\": \"{id}\"")));
}

#[rstest]
fn commit_clears_the_staging_area(init_repository_dir: TempDir) {
    let index = read_file(init_repository_dir.path(), ".strata/index.json");

    assert!(index.contains("\"staged_files\": {}"));
    assert!(index.contains("1.txt"));
}

#[rstest]
fn empty_staging_area_refuses_to_commit(repository_dir: TempDir) {
    run_strata(repository_dir.path(), &["init"]).assert().success();

    run_strata(repository_dir.path(), &["commit", "-m", "empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));
}

#[rstest]
fn second_commit_links_to_its_parent(init_repository_dir: TempDir) {
    let first = head_commit_id(init_repository_dir.path());

    write_file(init_repository_dir.path(), "1.txt", "one edited");
    run_strata(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    run_strata(init_repository_dir.path(), &["commit", "-m", "Second"])
        .assert()
        .success();

    let second = head_commit_id(init_repository_dir.path());
    assert_ne!(first, second);

    let meta = read_file(
        init_repository_dir.path(),
        &format!(".strata/commits/{second}/meta.json"),
    );
    assert!(meta.contains(&format!("\"parent\": \"{first}\"")));
}

#[rstest]
fn commit_all_restages_tracked_files(init_repository_dir: TempDir) {
    write_file(init_repository_dir.path(), "a/2.txt", "two edited");

    run_strata(
        init_repository_dir.path(),
        &["commit", "-a", "-m", "Bulk commit"],
    )
    .assert()
    .success();

    let id = head_commit_id(init_repository_dir.path());
    assert_eq!(
        read_file(
            init_repository_dir.path(),
            &format!(".strata/commits/{id}/a/2.txt")
        ),
        "two edited"
    );
}

#[rstest]
fn commit_reports_branch_and_message(init_repository_dir: TempDir) {
    write_file(init_repository_dir.path(), "1.txt", "next");
    run_strata(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_strata(init_repository_dir.path(), &["commit", "-m", "Next step"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[main]"))
        .stdout(predicate::str::contains("Next step"));
}
