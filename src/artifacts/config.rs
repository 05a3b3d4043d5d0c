//! Repository configuration (`config.json`).

use crate::artifacts::commit::Author;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";

/// Environment overrides for commit authorship.
const AUTHOR_NAME_VAR: &str = "STRATA_AUTHOR_NAME";
const AUTHOR_EMAIL_VAR: &str = "STRATA_AUTHOR_EMAIL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub core: CoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub email: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "Unknown".to_string());

        UserConfig {
            email: format!("{user}@localhost"),
            name: user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(rename = "repositoryformatversion")]
    pub repository_format_version: u32,
    pub filemode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            repository_format_version: 0,
            filemode: true,
            bare: false,
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults when the file is
    /// absent. A present-but-malformed file is an error, not a default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Commit authorship, with environment variables taking precedence over
    /// the configured user.
    pub fn author(&self) -> Author {
        Author {
            name: std::env::var(AUTHOR_NAME_VAR).unwrap_or_else(|_| self.user.name.clone()),
            email: std::env::var(AUTHOR_EMAIL_VAR).unwrap_or_else(|_| self.user.email.clone()),
        }
    }
}
