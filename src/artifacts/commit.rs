//! Commit records and their content-derived identifiers.
//!
//! A commit is immutable once written: metadata lives in
//! `commits/<id>/meta.json` and the snapshotted files next to it. The id is
//! derived from the message, the creation timestamp and the parent id, so
//! two commits only collide when all three match within the same second.

use crate::errors::{RepositoryError, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::path::PathBuf;

/// Length of the truncated hex id.
pub const SHORT_ID_LEN: usize = 8;

/// Timestamp format used in commit metadata.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Branch label recorded when committing with a detached HEAD.
pub const DETACHED_LABEL: &str = "detached";

/// Content-derived commit identifier, truncated to [`SHORT_ID_LEN`] hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn try_parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if raw.len() != SHORT_ID_LEN || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RepositoryError::InvalidReference {
                reason: format!("'{raw}' is not a {SHORT_ID_LEN}-character hex commit id"),
            });
        }

        Ok(Self(raw.to_lowercase()))
    }

    /// Derive the id of a new commit from its identity-bearing fields.
    pub fn derive(message: &str, timestamp: &str, parent: Option<&CommitId>) -> Self {
        let parent = parent.map(CommitId::as_str).unwrap_or("root");

        let mut hasher = Sha1::new();
        hasher.update(format!("{message}|{timestamp}|{parent}").as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Self(digest[..SHORT_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Immutable commit metadata as persisted in `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub timestamp: String,
    pub author: Author,
    pub parent: Option<CommitId>,
    /// Branch the commit was created on, or [`DETACHED_LABEL`].
    pub branch: String,
    /// Relative paths snapshotted into the commit directory, sorted.
    pub files: Vec<PathBuf>,
}

impl Commit {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// First line of the message, for one-line displays.
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn contains(&self, path: &std::path::Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}

/// Current local time in the repository's timestamp format.
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derive_is_deterministic() {
        let a = CommitId::derive("first", "2026-01-02 03:04:05", None);
        let b = CommitId::derive("first", "2026-01-02 03:04:05", None);

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), SHORT_ID_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn derive_depends_on_parent() {
        let root = CommitId::derive("msg", "2026-01-02 03:04:05", None);
        let child = CommitId::derive("msg", "2026-01-02 03:04:05", Some(&root));

        assert_ne!(root, child);
    }

    #[test]
    fn try_parse_rejects_non_hex_and_wrong_length() {
        assert!(CommitId::try_parse("abc123ef").is_ok());
        assert!(CommitId::try_parse("abc123e").is_err());
        assert!(CommitId::try_parse("abc123zz").is_err());
        assert!(CommitId::try_parse("").is_err());
    }

    #[test]
    fn short_message_takes_the_first_line() {
        let commit = Commit {
            id: CommitId::derive("a", "t", None),
            message: "subject\n\nbody line".to_string(),
            timestamp: "2026-01-02 03:04:05".to_string(),
            author: Author {
                name: "Test".to_string(),
                email: "test@localhost".to_string(),
            },
            parent: None,
            branch: "main".to_string(),
            files: vec![],
        };

        assert_eq!(commit.short_message(), "subject");
        assert!(commit.is_root());
    }
}
