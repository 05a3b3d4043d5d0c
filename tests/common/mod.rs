#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub fn run_strata(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("strata").expect("strata binary should be buildable");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn write_file(dir: &Path, rel: &str, content: &str) {
    write_bytes(dir, rel, content.as_bytes());
}

pub fn write_bytes(dir: &Path, rel: &str, content: &[u8]) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("parent directories should be creatable");
    }
    std::fs::write(path, content).expect("file should be writable");
}

pub fn read_file(dir: &Path, rel: &str) -> String {
    std::fs::read_to_string(dir.join(rel)).expect("file should be readable")
}

pub fn delete_file(dir: &Path, rel: &str) {
    std::fs::remove_file(dir.join(rel)).expect("file should be deletable");
}

/// Resolve the commit id HEAD currently points at, following a symbolic ref.
pub fn head_commit_id(dir: &Path) -> String {
    let head = read_file(dir, ".strata/HEAD");
    let head = head.trim();

    match head.strip_prefix("ref: refs/heads/") {
        Some(name) => read_file(dir, &format!(".strata/refs/heads/{name}"))
            .trim()
            .to_string(),
        None => head.to_string(),
    }
}

pub fn stdout_of(output: assert_cmd::assert::Assert) -> String {
    String::from_utf8(output.get_output().stdout.clone()).expect("stdout should be utf-8")
}

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("temp dir should be creatable")
}

/// A repository with three committed files: `1.txt`, `a/2.txt`, `a/b/3.txt`
/// (plus the generated `.strataignore`).
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_strata(repository_dir.path(), &["init"]).assert().success();

    write_file(repository_dir.path(), "1.txt", "one");
    write_file(repository_dir.path(), "a/2.txt", "two");
    write_file(repository_dir.path(), "a/b/3.txt", "three");

    run_strata(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    run_strata(repository_dir.path(), &["commit", "-m", "Initial commit"])
        .assert()
        .success();

    repository_dir
}
