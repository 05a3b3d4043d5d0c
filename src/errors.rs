//! Typed failures surfaced by the repository core.
//!
//! Every facade operation returns `Result<T, RepositoryError>`; rendering a
//! failure (and choosing the process exit status) is the CLI layer's job.
//! Structural errors abort an operation with no partial state change, while
//! per-file failures inside multi-file operations are collected into the
//! operation's payload instead of being raised through this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not a strata repository (run 'strata init' first)")]
    NotARepository,

    #[error("invalid reference: {reason}")]
    InvalidReference { reason: String },

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("commit '{0}' not found")]
    CommitNotFound(String),

    #[error("branch or commit '{0}' not found")]
    TargetNotFound(String),

    #[error("repository has no commits yet")]
    NoCommits,

    #[error("nothing to commit (staging area is empty)")]
    NothingToCommit,

    #[error("cannot delete the currently checked-out branch '{0}'")]
    CannotDeleteCurrentBranch(String),

    #[error("uncommitted changes in the working directory")]
    UncommittedChanges,

    #[error("'{}' is not staged", .0.display())]
    NotStaged(PathBuf),

    #[error("path '{}' does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("'{}' is a directory, not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("'{}' is ignored", .0.display())]
    IgnoredPath(PathBuf),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed metadata: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
