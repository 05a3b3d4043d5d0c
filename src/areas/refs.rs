//! HEAD and branch pointer persistence.
//!
//! HEAD is either symbolic (`ref: refs/heads/<name>`), direct (a commit id,
//! detached), or empty (no commits yet). Branch refs live as flat files
//! under `refs/heads/`, one commit id per file. Ref writes take an
//! exclusive advisory lock; readers of a concurrently-updated ref still see
//! either the old or the new id because writes are single small `write_all`
//! calls, but nothing serializes two racing commands beyond that.

use crate::artifacts::branch_name::BranchName;
use crate::artifacts::commit::CommitId;
use crate::errors::{RepositoryError, Result};
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const HEAD_FILE: &str = "HEAD";

const SYMREF_PREFIX: &str = "ref: refs/heads/";

/// Parsed state of the HEAD pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD follows a branch; `target` is `None` while the branch has no
    /// commits yet (freshly initialized repository).
    Attached {
        branch: BranchName,
        target: Option<CommitId>,
    },
    Detached(CommitId),
    Unborn,
}

impl HeadState {
    pub fn commit_id(&self) -> Option<&CommitId> {
        match self {
            HeadState::Attached { target, .. } => target.as_ref(),
            HeadState::Detached(id) => Some(id),
            HeadState::Unborn => None,
        }
    }

    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            HeadState::Attached { branch, .. } => Some(branch),
            _ => None,
        }
    }
}

/// File-backed reference store rooted at the metadata directory.
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    pub fn head(&self) -> Result<HeadState> {
        let head_path = self.head_path();
        if !head_path.exists() {
            return Ok(HeadState::Unborn);
        }

        let content = std::fs::read_to_string(&head_path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(HeadState::Unborn);
        }

        if let Some(name) = content.strip_prefix(SYMREF_PREFIX) {
            let branch =
                BranchName::try_parse(name).map_err(|_| RepositoryError::InvalidReference {
                    reason: format!("HEAD points at malformed branch name '{name}'"),
                })?;
            let target = self.read_branch(&branch)?;

            return Ok(HeadState::Attached { branch, target });
        }

        if content.starts_with("ref:") {
            return Err(RepositoryError::InvalidReference {
                reason: format!("unparseable symbolic HEAD '{content}'"),
            });
        }

        Ok(HeadState::Detached(CommitId::try_parse(content)?))
    }

    /// Commit id HEAD currently resolves to, if any.
    pub fn resolve_head(&self) -> Result<Option<CommitId>> {
        Ok(self.head()?.commit_id().cloned())
    }

    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        Ok(self.head()?.branch().cloned())
    }

    /// Point HEAD at `id`. With a branch, HEAD becomes symbolic and the
    /// branch ref is moved to `id`; without one, HEAD detaches.
    pub fn set_head(&self, id: &CommitId, branch: Option<&BranchName>) -> Result<()> {
        match branch {
            Some(branch) => {
                debug!(%branch, %id, "updating symbolic HEAD");
                self.write_ref_file(&self.branch_path(branch), &format!("{id}\n"))?;
                self.write_ref_file(&self.head_path(), &format!("{SYMREF_PREFIX}{branch}\n"))
            }
            None => {
                debug!(%id, "detaching HEAD");
                self.write_ref_file(&self.head_path(), &format!("{id}\n"))
            }
        }
    }

    /// Attach HEAD to a branch without touching the branch ref.
    pub fn attach_head(&self, branch: &BranchName) -> Result<()> {
        self.write_ref_file(&self.head_path(), &format!("{SYMREF_PREFIX}{branch}\n"))
    }

    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads = self.heads_path();
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut branches: Vec<BranchName> = WalkDir::new(&heads)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| BranchName::try_parse(&entry.file_name().to_string_lossy()).ok())
            .collect();

        branches.sort();
        Ok(branches)
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).exists()
    }

    /// Commit id a branch points at; `None` when the ref file is missing or
    /// still empty (branch created at init, before the first commit).
    pub fn read_branch(&self, name: &BranchName) -> Result<Option<CommitId>> {
        let path = self.branch_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        CommitId::try_parse(content)
            .map(Some)
            .map_err(|_| RepositoryError::InvalidReference {
                reason: format!("branch '{name}' contains unparseable content"),
            })
    }

    pub fn create_branch(&self, name: &BranchName, id: &CommitId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchAlreadyExists(name.to_string()));
        }

        debug!(branch = %name, at = %id, "creating branch");
        self.write_ref_file(&self.branch_path(name), &format!("{id}\n"))
    }

    /// Delete a branch ref, returning the id it pointed at.
    pub fn delete_branch(&self, name: &BranchName) -> Result<Option<CommitId>> {
        if !self.branch_exists(name) {
            return Err(RepositoryError::BranchNotFound(name.to_string()));
        }

        if self.current_branch()?.as_ref() == Some(name) {
            return Err(RepositoryError::CannotDeleteCurrentBranch(name.to_string()));
        }

        let id = self.read_branch(name)?;
        std::fs::remove_file(self.branch_path(name))?;
        debug!(branch = %name, "deleted branch");

        Ok(id)
    }

    /// Rename a branch; when it is the current branch, HEAD's symbolic
    /// target is rewritten in the same operation. Returns whether HEAD
    /// followed the rename.
    pub fn rename_branch(&self, old: &BranchName, new: &BranchName) -> Result<bool> {
        if !self.branch_exists(old) {
            return Err(RepositoryError::BranchNotFound(old.to_string()));
        }
        if self.branch_exists(new) {
            return Err(RepositoryError::BranchAlreadyExists(new.to_string()));
        }

        std::fs::rename(self.branch_path(old), self.branch_path(new))?;

        let head_follows = self.current_branch()?.as_ref() == Some(old);
        if head_follows {
            self.attach_head(new)?;
        }
        debug!(%old, %new, head_follows, "renamed branch");

        Ok(head_follows)
    }

    /// Locked whole-file rewrite of a single ref.
    fn write_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        Ok(())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_FILE)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.heads_path().join(name.as_str())
    }
}
