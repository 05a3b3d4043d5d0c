//! Immutable commit storage.
//!
//! Each commit is a directory under `commits/<id>` holding `meta.json` and a
//! full copy of every snapshotted file, directory structure preserved.
//! Commits are never rewritten or deleted by normal operations; revert and
//! reset only move pointers or overwrite the working tree.

use crate::areas::workspace::Workspace;
use crate::artifacts::branch_name::BranchName;
use crate::artifacts::commit::{current_timestamp, Author, Commit, CommitId, DETACHED_LABEL};
use crate::errors::{RepositoryError, Result};
use derive_new::new;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const COMMITS_DIR: &str = "commits";

const META_FILE: &str = "meta.json";

/// Outcome of copying a commit's snapshot back into the working tree.
#[derive(Debug, Clone, Default)]
pub struct RestoreOutcome {
    pub restored: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Store rooted at the `commits` directory of the metadata root.
#[derive(Debug, new)]
pub struct CommitStore {
    path: Box<Path>,
}

impl CommitStore {
    /// Snapshot `paths` out of the working tree into a new commit.
    ///
    /// Unreadable source files are collected and returned alongside the
    /// commit rather than failing the operation; any structural failure
    /// (commit directory, snapshot write, metadata write) removes the
    /// partial commit directory before the error is surfaced, so no
    /// dangling commit can ever be observed.
    pub fn create_commit(
        &self,
        message: &str,
        paths: &[PathBuf],
        workspace: &Workspace,
        author: Author,
        parent: Option<CommitId>,
        branch: Option<&BranchName>,
    ) -> Result<(Commit, Vec<PathBuf>)> {
        let timestamp = current_timestamp();
        let id = CommitId::derive(message, &timestamp, parent.as_ref());
        let commit_dir = self.path.join(id.as_str());

        std::fs::create_dir_all(&commit_dir)?;

        let mut snapshotted = Vec::new();
        let mut failed = Vec::new();

        for path in paths {
            let bytes = match workspace.read_bytes(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping unreadable file");
                    failed.push(path.clone());
                    continue;
                }
            };

            if let Err(err) = write_snapshot(&commit_dir, path, &bytes) {
                self.discard(&commit_dir);
                return Err(err);
            }
            snapshotted.push(path.clone());
        }

        snapshotted.sort();

        let commit = Commit {
            id: id.clone(),
            message: message.trim().to_string(),
            timestamp,
            author,
            parent,
            branch: branch
                .map(|b| b.to_string())
                .unwrap_or_else(|| DETACHED_LABEL.to_string()),
            files: snapshotted,
        };

        if let Err(err) = self.write_meta(&commit_dir, &commit) {
            self.discard(&commit_dir);
            return Err(err);
        }

        debug!(%id, files = commit.files.len(), skipped = failed.len(), "created commit");
        Ok((commit, failed))
    }

    pub fn commit(&self, id: &CommitId) -> Result<Option<Commit>> {
        let meta_path = self.path.join(id.as_str()).join(META_FILE);
        if !meta_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(meta_path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn require(&self, id: &CommitId) -> Result<Commit> {
        self.commit(id)?
            .ok_or_else(|| RepositoryError::CommitNotFound(id.to_string()))
    }

    /// Walk parent links from `id` to the root. A repeated id means the
    /// graph is corrupt; the walk treats it as the end of the chain rather
    /// than looping, and a missing parent likewise terminates.
    pub fn commit_chain(&self, id: &CommitId) -> Result<Vec<Commit>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(id.clone());

        while let Some(current) = cursor {
            if !visited.insert(current.clone()) {
                warn!(id = %current, "cycle in commit graph, truncating chain");
                break;
            }

            let Some(commit) = self.commit(&current)? else {
                break;
            };

            cursor = commit.parent.clone();
            chain.push(commit);
        }

        Ok(chain)
    }

    /// Every commit in the store. Directories with unreadable metadata are
    /// skipped with a warning so one corrupt record cannot hide the rest of
    /// the graph.
    pub fn all_commits(&self) -> Result<Vec<Commit>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut commits = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }

            let Ok(id) = CommitId::try_parse(&entry.file_name().to_string_lossy()) else {
                warn!(name = %entry.file_name().to_string_lossy(), "skipping non-commit directory");
                continue;
            };

            match self.commit(&id) {
                Ok(Some(commit)) => commits.push(commit),
                Ok(None) => warn!(%id, "commit directory without metadata"),
                Err(err) => warn!(%id, %err, "skipping commit with unreadable metadata"),
            }
        }

        Ok(commits)
    }

    /// Bytes of one snapshotted file, `None` when the commit or path is
    /// absent from the snapshot.
    pub fn snapshot_bytes(&self, id: &CommitId, rel: &Path) -> Result<Option<Vec<u8>>> {
        let path = self.path.join(id.as_str()).join(rel);
        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(std::fs::read(path)?))
    }

    /// Copy a commit's files back into the working tree. Per-file failures
    /// are collected; the restore continues over the remaining files.
    pub fn restore(&self, commit: &Commit, workspace: &Workspace) -> Result<RestoreOutcome> {
        let mut outcome = RestoreOutcome::default();

        for path in &commit.files {
            match self.snapshot_bytes(&commit.id, path)? {
                Some(bytes) => match workspace.write_file(path, &bytes) {
                    Ok(()) => outcome.restored.push(path.clone()),
                    Err(err) => {
                        warn!(path = %path.display(), %err, "failed to restore file");
                        outcome.failed.push(path.clone());
                    }
                },
                None => {
                    warn!(path = %path.display(), commit = %commit.id, "snapshot file missing");
                    outcome.failed.push(path.clone());
                }
            }
        }

        debug!(commit = %commit.id, restored = outcome.restored.len(), failed = outcome.failed.len(), "restored snapshot");
        Ok(outcome)
    }

    fn write_meta(&self, commit_dir: &Path, commit: &Commit) -> Result<()> {
        let mut content = serde_json::to_string_pretty(commit)?;
        content.push('\n');
        std::fs::write(commit_dir.join(META_FILE), content)?;

        Ok(())
    }

    fn discard(&self, commit_dir: &Path) {
        if let Err(err) = std::fs::remove_dir_all(commit_dir) {
            warn!(dir = %commit_dir.display(), %err, "failed to clean up partial commit");
        }
    }
}

/// Write one file into the commit directory, preserving its relative path.
fn write_snapshot(commit_dir: &Path, rel: &Path, bytes: &[u8]) -> Result<()> {
    let target = commit_dir.join(rel);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, bytes)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        _dir: assert_fs::TempDir,
        store: CommitStore,
        workspace: Workspace,
    }

    fn fixture() -> Fixture {
        let dir = assert_fs::TempDir::new().unwrap();
        let commits = dir.path().join(".strata").join(COMMITS_DIR);
        std::fs::create_dir_all(&commits).unwrap();

        Fixture {
            store: CommitStore::new(commits.into_boxed_path()),
            workspace: Workspace::new(dir.path().to_path_buf().into_boxed_path()),
            _dir: dir,
        }
    }

    fn author() -> Author {
        Author {
            name: "Test".to_string(),
            email: "test@localhost".to_string(),
        }
    }

    #[test]
    fn create_commit_snapshots_files_and_metadata() {
        let fx = fixture();
        fx.workspace.write_file(Path::new("a.txt"), b"alpha").unwrap();
        fx.workspace
            .write_file(Path::new("dir/b.txt"), b"beta")
            .unwrap();

        let (commit, failed) = fx
            .store
            .create_commit(
                "first",
                &[PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")],
                &fx.workspace,
                author(),
                None,
                None,
            )
            .unwrap();

        assert!(failed.is_empty());
        assert_eq!(
            commit.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")]
        );
        assert_eq!(commit.branch, DETACHED_LABEL);

        let reloaded = fx.store.require(&commit.id).unwrap();
        assert_eq!(reloaded, commit);
        assert_eq!(
            fx.store
                .snapshot_bytes(&commit.id, Path::new("dir/b.txt"))
                .unwrap(),
            Some(b"beta".to_vec())
        );
    }

    #[test]
    fn unreadable_files_are_collected_not_fatal() {
        let fx = fixture();
        fx.workspace.write_file(Path::new("ok.txt"), b"ok").unwrap();

        let (commit, failed) = fx
            .store
            .create_commit(
                "partial",
                &[PathBuf::from("ok.txt"), PathBuf::from("missing.txt")],
                &fx.workspace,
                author(),
                None,
                None,
            )
            .unwrap();

        assert_eq!(commit.files, vec![PathBuf::from("ok.txt")]);
        assert_eq!(failed, vec![PathBuf::from("missing.txt")]);
    }

    #[test]
    fn chain_walks_to_the_root() {
        let fx = fixture();
        fx.workspace.write_file(Path::new("a.txt"), b"1").unwrap();

        let (root, _) = fx
            .store
            .create_commit("root", &[PathBuf::from("a.txt")], &fx.workspace, author(), None, None)
            .unwrap();
        let (child, _) = fx
            .store
            .create_commit(
                "child",
                &[PathBuf::from("a.txt")],
                &fx.workspace,
                author(),
                Some(root.id.clone()),
                None,
            )
            .unwrap();

        let chain = fx.store.commit_chain(&child.id).unwrap();
        let messages: Vec<&str> = chain.iter().map(|c| c.message.as_str()).collect();

        assert_eq!(messages, vec!["child", "root"]);
    }

    #[test]
    fn chain_terminates_on_a_parent_cycle() {
        let fx = fixture();
        let a = CommitId::try_parse("aaaaaaaa").unwrap();
        let b = CommitId::try_parse("bbbbbbbb").unwrap();

        for (id, parent) in [(&a, &b), (&b, &a)] {
            let commit = Commit {
                id: id.clone(),
                message: format!("commit {id}"),
                timestamp: "2026-01-02 03:04:05".to_string(),
                author: author(),
                parent: Some(parent.clone()),
                branch: "main".to_string(),
                files: vec![],
            };
            let dir = fx.store.path.join(id.as_str());
            std::fs::create_dir_all(&dir).unwrap();
            fx.store.write_meta(&dir, &commit).unwrap();
        }

        let chain = fx.store.commit_chain(&a).unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn restore_round_trips_content() {
        let fx = fixture();
        fx.workspace
            .write_file(Path::new("deep/file.txt"), b"original")
            .unwrap();

        let (commit, _) = fx
            .store
            .create_commit(
                "snap",
                &[PathBuf::from("deep/file.txt")],
                &fx.workspace,
                author(),
                None,
                None,
            )
            .unwrap();

        fx.workspace
            .write_file(Path::new("deep/file.txt"), b"mangled")
            .unwrap();
        let outcome = fx.store.restore(&commit, &fx.workspace).unwrap();

        assert_eq!(outcome.restored, vec![PathBuf::from("deep/file.txt")]);
        assert!(outcome.failed.is_empty());
        assert_eq!(
            fx.workspace.read_bytes(Path::new("deep/file.txt")).unwrap(),
            b"original"
        );
    }

    #[test]
    fn missing_commit_reads_as_none() {
        let fx = fixture();
        let id = CommitId::try_parse("deadbeef").unwrap();

        assert_eq!(fx.store.commit(&id).unwrap(), None);
        assert!(matches!(
            fx.store.require(&id),
            Err(RepositoryError::CommitNotFound(_))
        ));
    }
}
