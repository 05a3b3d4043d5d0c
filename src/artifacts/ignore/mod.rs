//! Ignore-pattern evaluation.
//!
//! Rules come from two sources: built-in defaults (always active, protecting
//! the metadata directory and common editor/OS droppings) and the user's
//! `.strataignore` file. Defaults are prepended, so a user negation can
//! re-include anything they cover. Evaluation is strictly in file order and
//! the last matching rule wins.

pub mod pattern;

use crate::artifacts::ignore::pattern::IgnorePattern;
use std::path::Path;
use tracing::warn;

pub const IGNORE_FILE: &str = ".strataignore";

const DEFAULT_PATTERNS: &[&str] = &[
    ".strata/",
    ".DS_Store",
    "Thumbs.db",
    "*.swp",
    "*.swo",
    "*~",
];

#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreMatcher {
    /// Load defaults plus the `.strataignore` file at the repository root.
    pub fn load(root: &Path) -> Self {
        let mut lines: Vec<String> = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();

        if let Ok(content) = std::fs::read_to_string(root.join(IGNORE_FILE)) {
            lines.extend(content.lines().map(|l| l.to_string()));
        }

        Self::from_lines(lines.iter().map(|l| l.as_str()))
    }

    /// Build a matcher from raw pattern lines; blank lines and `#` comments
    /// are skipped, unparseable patterns are dropped with a warning.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let patterns = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match IgnorePattern::parse(line) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    warn!(pattern = line, %err, "skipping unparseable ignore pattern");
                    None
                }
            })
            .collect();

        IgnoreMatcher { patterns }
    }

    /// Evaluate every rule in order against the normalized relative path;
    /// the outcome of the last rule that matches (directly, or via one of
    /// the path's ancestor directories) decides.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let rel = normalize(path);
        if rel.is_empty() {
            return false;
        }

        let ancestors = ancestor_dirs(&rel);

        let mut ignored = false;
        for pattern in &self.patterns {
            let hit = pattern.matches(&rel, is_dir)
                || ancestors.iter().any(|dir| pattern.matches(dir, true));

            if hit {
                ignored = !pattern.negation();
            }
        }

        ignored
    }
}

/// Forward-slash relative form, with any leading `./` stripped.
fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Proper ancestor directories of a normalized path, shallowest first.
fn ancestor_dirs(rel: &str) -> Vec<String> {
    rel.char_indices()
        .filter(|(_, c)| *c == '/')
        .map(|(idx, _)| rel[..idx].to_string())
        .collect()
}
