//! The staging index (`index.json`).
//!
//! Two pieces of state: the tracked set (paths the user has opted into,
//! surviving commits) and the staged map (path to content hash, cleared on
//! every successful commit). The file is read fully, mutated in memory and
//! rewritten wholesale under an exclusive advisory lock, so a reader never
//! observes a partial update; two racing writers can still lose one
//! another's read-modify-write, which is the accepted single-user tradeoff.

use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnoreMatcher;
use crate::errors::{RepositoryError, Result};
use file_guard::Lock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INDEX_FILE: &str = "index.json";

const INDEX_VERSION: &str = "1.0";

/// Whether a staged path was new to the tracked set when staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Added,
    Modified,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Added => write!(f, "added"),
            EntryStatus::Modified => write!(f, "modified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    pub hash: String,
    pub status: EntryStatus,
}

/// On-disk shape of the index file.
#[derive(Debug, Serialize, Deserialize)]
struct IndexRecord {
    tracked_files: Vec<PathBuf>,
    staged_files: BTreeMap<PathBuf, StagedEntry>,
    version: String,
}

#[derive(Debug)]
pub struct StagingIndex {
    path: Box<Path>,
    tracked: BTreeSet<PathBuf>,
    staged: BTreeMap<PathBuf, StagedEntry>,
}

impl StagingIndex {
    pub fn new(path: Box<Path>) -> Self {
        StagingIndex {
            path,
            tracked: BTreeSet::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace in-memory state with the persisted index. A missing file is
    /// an empty index; a malformed one is rejected, not defaulted.
    pub fn load(&mut self) -> Result<()> {
        self.tracked.clear();
        self.staged.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(());
        }

        let record: IndexRecord = serde_json::from_str(&content)
            .map_err(|err| RepositoryError::CorruptIndex(err.to_string()))?;

        self.tracked = record.tracked_files.into_iter().collect();
        self.staged = record.staged_files;

        Ok(())
    }

    /// Wholesale locked rewrite of the index file.
    pub fn save(&self) -> Result<()> {
        let record = IndexRecord {
            tracked_files: self.tracked.iter().cloned().collect(),
            staged_files: self.staged.clone(),
            version: INDEX_VERSION.to_string(),
        };

        let mut content = serde_json::to_string_pretty(&record)?;
        content.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        Ok(())
    }

    pub fn tracked(&self) -> &BTreeSet<PathBuf> {
        &self.tracked
    }

    pub fn staged(&self) -> &BTreeMap<PathBuf, StagedEntry> {
        &self.staged
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains(path)
    }

    pub fn staged_entry(&self, path: &Path) -> Option<&StagedEntry> {
        self.staged.get(path)
    }

    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Stage a file: it must exist, be a regular file and not be ignored.
    /// Restaging refreshes the hash; the `added`/`modified` status is
    /// decided against the tracked set before the path joins it.
    pub fn stage(
        &mut self,
        path: &Path,
        workspace: &Workspace,
        ignore: &IgnoreMatcher,
    ) -> Result<EntryStatus> {
        if ignore.is_ignored(path, workspace.is_dir(path)) {
            return Err(RepositoryError::IgnoredPath(path.to_path_buf()));
        }
        if !workspace.exists(path) {
            return Err(RepositoryError::PathNotFound(path.to_path_buf()));
        }
        if workspace.is_dir(path) {
            return Err(RepositoryError::NotAFile(path.to_path_buf()));
        }

        let status = if self.tracked.contains(path) {
            EntryStatus::Modified
        } else {
            EntryStatus::Added
        };

        let hash = workspace.hash_file(path)?;
        self.tracked.insert(path.to_path_buf());
        self.staged
            .insert(path.to_path_buf(), StagedEntry { hash, status });
        debug!(path = %path.display(), %status, "staged file");

        Ok(status)
    }

    /// Re-stage every tracked file that still exists on disk; files removed
    /// from the working tree are skipped (they surface as deleted in
    /// status, not as staged entries).
    pub fn stage_all(&mut self, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        let mut restaged = Vec::new();

        for path in self.tracked.clone() {
            if !workspace.exists(&path) || workspace.is_dir(&path) {
                continue;
            }

            let hash = workspace.hash_file(&path)?;
            self.staged.insert(
                path.clone(),
                StagedEntry {
                    hash,
                    status: EntryStatus::Modified,
                },
            );
            restaged.push(path);
        }

        Ok(restaged)
    }

    /// Drop a path from the staged map; the tracked set is untouched.
    pub fn unstage(&mut self, path: &Path) -> Result<StagedEntry> {
        self.staged
            .remove(path)
            .ok_or_else(|| RepositoryError::NotStaged(path.to_path_buf()))
    }

    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    /// Replace the tracked set, as checkout/revert do when the working tree
    /// is rebuilt from a commit.
    pub fn set_tracked(&mut self, files: impl IntoIterator<Item = PathBuf>) {
        self.tracked = files.into_iter().collect();
    }
}
