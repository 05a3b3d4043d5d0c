//! Working-tree status classification.

pub mod engine;

use crate::areas::index::EntryStatus;
use crate::artifacts::branch_name::BranchName;
use crate::artifacts::commit::CommitId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Classification of a single tracked path, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Untracked,
    Staged,
    /// Staged, then edited again afterwards; reported on both sides.
    StagedAndModified,
    Modified,
    Deleted,
    /// Deleted from disk while still sitting in the staging area.
    StagedDeleted,
    Unchanged,
}

/// Everything `status` reports; all sets iterate in lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub branch: Option<BranchName>,
    pub head: Option<CommitId>,
    /// Staged paths with their staged kind (`added` vs `modified`).
    pub staged: BTreeMap<PathBuf, EntryStatus>,
    /// Tracked paths whose working-tree content differs from the staged
    /// hash or the HEAD snapshot.
    pub unstaged_modified: BTreeSet<PathBuf>,
    pub deleted: BTreeSet<PathBuf>,
    pub staged_deleted: BTreeSet<PathBuf>,
    pub untracked: BTreeSet<PathBuf>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged_modified.is_empty()
            && self.deleted.is_empty()
            && self.staged_deleted.is_empty()
            && self.untracked.is_empty()
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty() || !self.staged_deleted.is_empty()
    }
}
