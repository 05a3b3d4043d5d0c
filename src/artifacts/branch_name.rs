//! Validated branch names.
//!
//! Branch refs are stored as flat files under `refs/heads`, so names may not
//! contain a path separator; whitespace is rejected because names appear
//! unquoted in HEAD and in command output.

use crate::errors::{RepositoryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(RepositoryError::InvalidBranchName {
                name: name.to_string(),
                reason: "name is empty".to_string(),
            });
        }

        if name.contains('/') {
            return Err(RepositoryError::InvalidBranchName {
                name: name.to_string(),
                reason: "name contains '/'".to_string(),
            });
        }

        if name.chars().any(char::is_whitespace) {
            return Err(RepositoryError::InvalidBranchName {
                name: name.to_string(),
                reason: "name contains whitespace".to_string(),
            });
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
