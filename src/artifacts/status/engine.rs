//! The change engine: status classification and diff computation.
//!
//! State-free; every query re-reads the index, refs and snapshots it needs
//! through the repository it borrows.

use crate::areas::index::StagedEntry;
use crate::areas::repository::Repository;
use crate::areas::workspace::{hash_bytes, Workspace};
use crate::artifacts::commit::Commit;
use crate::artifacts::diff::unified::{diff_stats, is_binary, unified_hunks};
use crate::artifacts::diff::{DiffReport, DiffSource, FileChange, FileDiff};
use crate::artifacts::status::{FileStatus, StatusReport};
use crate::errors::Result;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Working bytes per path for one diff side; `None` marks content that
/// could not be read and degrades to the binary marker.
type SideContents = BTreeMap<PathBuf, Option<Vec<u8>>>;

#[derive(new)]
pub struct ChangeEngine<'r> {
    repository: &'r Repository,
}

impl ChangeEngine<'_> {
    pub fn status(&self) -> Result<StatusReport> {
        let head_state = self.repository.refs().head()?;
        let head_commit = match head_state.commit_id() {
            Some(id) => self.repository.commits().commit(id)?,
            None => None,
        };

        let index = self.repository.index();
        let mut report = StatusReport {
            branch: head_state.branch().cloned(),
            head: head_state.commit_id().cloned(),
            ..Default::default()
        };

        for path in index.tracked() {
            let staged = index.staged_entry(path);

            match self.classify(path, staged, head_commit.as_ref())? {
                FileStatus::Staged => {
                    if let Some(entry) = staged {
                        report.staged.insert(path.clone(), entry.status);
                    }
                }
                FileStatus::StagedAndModified => {
                    if let Some(entry) = staged {
                        report.staged.insert(path.clone(), entry.status);
                    }
                    report.unstaged_modified.insert(path.clone());
                }
                FileStatus::Modified => {
                    report.unstaged_modified.insert(path.clone());
                }
                FileStatus::Deleted => {
                    report.deleted.insert(path.clone());
                }
                FileStatus::StagedDeleted => {
                    report.staged_deleted.insert(path.clone());
                }
                FileStatus::Unchanged | FileStatus::Untracked => {}
            }
        }

        for path in self
            .repository
            .workspace()
            .list_files(self.repository.ignore())
        {
            if !index.is_tracked(&path) {
                report.untracked.insert(path);
            }
        }

        Ok(report)
    }

    /// Classify one tracked path, in priority order: missing from disk
    /// first, then the staged hash, then the HEAD snapshot.
    fn classify(
        &self,
        path: &Path,
        staged: Option<&StagedEntry>,
        head: Option<&Commit>,
    ) -> Result<FileStatus> {
        let workspace = self.repository.workspace();

        if !workspace.exists(path) {
            return Ok(if staged.is_some() {
                FileStatus::StagedDeleted
            } else {
                FileStatus::Deleted
            });
        }

        let live_hash = match workspace.hash_file(path) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable file counts as modified");
                return Ok(if staged.is_some() {
                    FileStatus::StagedAndModified
                } else {
                    FileStatus::Modified
                });
            }
        };

        if let Some(entry) = staged {
            return Ok(if entry.hash == live_hash {
                FileStatus::Staged
            } else {
                FileStatus::StagedAndModified
            });
        }

        if let Some(commit) = head {
            if commit.contains(path) {
                if let Some(bytes) = self
                    .repository
                    .commits()
                    .snapshot_bytes(&commit.id, path)?
                {
                    return Ok(if hash_bytes(&bytes) == live_hash {
                        FileStatus::Unchanged
                    } else {
                        FileStatus::Modified
                    });
                }
            }
        }

        Ok(FileStatus::Unchanged)
    }

    /// Compare two sides over the union of their paths.
    pub fn diff(&self, from: &DiffSource, to: &DiffSource) -> Result<DiffReport> {
        let old_side = self.side_contents(from)?;
        let new_side = self.side_contents(to)?;

        let mut paths: BTreeSet<PathBuf> =
            old_side.keys().chain(new_side.keys()).cloned().collect();

        // A stage side narrows the comparison to staged paths; files only
        // present in the other side are not part of the staged change set.
        if matches!(from, DiffSource::Stage) || matches!(to, DiffSource::Stage) {
            let index = self.repository.index();
            paths.retain(|path| index.staged().contains_key(path));
        }

        let mut report = DiffReport {
            from: from.label(),
            to: to.label(),
            files: Vec::new(),
            added: 0,
            removed: 0,
        };

        for path in paths {
            let change = match (old_side.get(&path), new_side.get(&path)) {
                (None, Some(Some(new))) => {
                    let lines = count_lines(new);
                    report.added += lines;
                    FileChange::Added { lines }
                }
                (Some(Some(old)), None) => {
                    let lines = count_lines(old);
                    report.removed += lines;
                    FileChange::Deleted { lines }
                }
                (Some(Some(old)), Some(Some(new))) => {
                    if old == new {
                        continue;
                    }
                    if is_binary(old) || is_binary(new) {
                        FileChange::Binary
                    } else {
                        let old_text = String::from_utf8_lossy(old);
                        let new_text = String::from_utf8_lossy(new);
                        let hunks = unified_hunks(&old_text, &new_text);
                        let (added, removed) = diff_stats(&old_text, &new_text);
                        report.added += added;
                        report.removed += removed;
                        FileChange::Modified {
                            hunks,
                            added,
                            removed,
                        }
                    }
                }
                // An unreadable side degrades to the binary marker.
                (Some(None), _) | (_, Some(None)) => FileChange::Binary,
                (None, None) => continue,
            };

            report.files.push(FileDiff { path, change });
        }

        Ok(report)
    }

    pub fn diff_stats(&self, from: &DiffSource, to: &DiffSource) -> Result<(usize, usize)> {
        let report = self.diff(from, to)?;
        Ok((report.added, report.removed))
    }

    fn side_contents(&self, source: &DiffSource) -> Result<SideContents> {
        let workspace = self.repository.workspace();
        let mut side = SideContents::new();

        match source {
            DiffSource::WorkingTree => {
                let index = self.repository.index();
                for path in index.tracked() {
                    if !workspace.exists(path) || workspace.is_dir(path) {
                        continue;
                    }
                    side.insert(path.clone(), read_or_degrade(workspace, path));
                }
            }
            DiffSource::Stage => {
                let index = self.repository.index();
                for path in index.staged().keys() {
                    if !workspace.exists(path) {
                        continue;
                    }
                    side.insert(path.clone(), read_or_degrade(workspace, path));
                }
            }
            DiffSource::Commit(id) => {
                let commit = self.repository.commits().require(id)?;
                for path in &commit.files {
                    match self.repository.commits().snapshot_bytes(id, path) {
                        Ok(Some(bytes)) => {
                            side.insert(path.clone(), Some(bytes));
                        }
                        Ok(None) => {
                            warn!(path = %path.display(), commit = %id, "snapshot file missing");
                        }
                        Err(err) => {
                            warn!(path = %path.display(), %err, "unreadable snapshot");
                            side.insert(path.clone(), None);
                        }
                    }
                }
            }
        }

        Ok(side)
    }
}

fn read_or_degrade(workspace: &Workspace, path: &Path) -> Option<Vec<u8>> {
    match workspace.read_bytes(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable working file");
            None
        }
    }
}

fn count_lines(bytes: &[u8]) -> usize {
    if is_binary(bytes) {
        return 0;
    }

    String::from_utf8_lossy(bytes).lines().count()
}
