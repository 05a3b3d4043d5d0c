//! Working-tree access.
//!
//! All paths handed in and out are relative to the repository root; the
//! workspace joins them against its root for the actual file operations.

use crate::artifacts::ignore::IgnoreMatcher;
use crate::errors::Result;
use sha1::{Digest, Sha1};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::areas::repository::METADATA_DIR;

/// Content hash of a byte slice, as used by the staging index.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);

    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
pub struct Workspace {
    root: Box<Path>,
}

impl Workspace {
    pub fn new(root: Box<Path>) -> Self {
        Workspace { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self, rel: &Path) -> bool {
        self.root.join(rel).exists()
    }

    pub fn is_dir(&self, rel: &Path) -> bool {
        self.root.join(rel).is_dir()
    }

    pub fn read_bytes(&self, rel: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.root.join(rel))?)
    }

    pub fn hash_file(&self, rel: &Path) -> Result<String> {
        Ok(hash_bytes(&self.read_bytes(rel)?))
    }

    /// Write a file, creating missing parent directories.
    pub fn write_file(&self, rel: &Path, data: &[u8]) -> Result<()> {
        let target = self.root.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, data)?;

        Ok(())
    }

    /// Every non-ignored file in the tree, relative and sorted. Ignored
    /// directories are pruned without descending into them.
    pub fn list_files(&self, ignore: &IgnoreMatcher) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| {
                let Ok(rel) = entry.path().strip_prefix(self.root.as_ref()) else {
                    return true;
                };
                rel.as_os_str().is_empty() || !ignore.is_ignored(rel, entry.path().is_dir())
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.root.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();

        files.sort();
        files
    }

    /// Expand a user-supplied target into concrete relative file paths:
    /// directories recurse, `*`/`?` patterns glob against the tree, anything
    /// else passes through (existence is the caller's concern).
    pub fn expand_target(&self, raw: &str) -> Vec<PathBuf> {
        let rel = normalize_rel(raw);

        if self.is_dir(&rel) {
            return self.files_under(&rel);
        }

        if raw.contains('*') || raw.contains('?') {
            let pattern = glob_regex(&rel.to_string_lossy());
            return self
                .all_files()
                .into_iter()
                .filter(|path| pattern.is_match(&path.to_string_lossy()))
                .collect();
        }

        vec![rel]
    }

    fn files_under(&self, rel: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(self.root.join(rel))
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.root.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();

        files.sort();
        files
    }

    /// All files in the tree except the metadata directory, unfiltered by
    /// ignore rules (staging applies those per file).
    fn all_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.root.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();

        files.sort();
        files
    }
}

/// Strip `./` prefixes and current-dir components from a user path.
pub(crate) fn normalize_rel(raw: &str) -> PathBuf {
    Path::new(raw)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn glob_regex(glob: &str) -> regex::Regex {
    let mut pattern = String::with_capacity(glob.len() * 2);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c if "\\.+()[]{}^$|".contains(c) => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push('$');

    regex::Regex::new(&pattern).unwrap_or_else(|_| regex::Regex::new("$^").expect("valid regex"))
}
