//! A single gitignore-style pattern.
//!
//! Grammar subset: leading `!` negates, trailing `/` restricts the match to
//! directories, leading `/` anchors the pattern to the repository root, and
//! `*` / `?` are fnmatch-style wildcards (`*` crosses path separators).
//! Patterns without a `/` match by basename anywhere in the tree.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    negation: bool,
    directory_only: bool,
    anchored: bool,
    /// Pattern body contains a separator, so it matches against the full
    /// relative path instead of the basename.
    path_scoped: bool,
    matcher: Regex,
}

impl IgnorePattern {
    pub fn parse(raw: &str) -> Result<Self, regex::Error> {
        let mut body = raw;

        let negation = body.starts_with('!');
        if negation {
            body = &body[1..];
        }

        let directory_only = body.ends_with('/');
        if directory_only {
            body = &body[..body.len() - 1];
        }

        let anchored = body.starts_with('/');
        if anchored {
            body = &body[1..];
        }

        let path_scoped = body.contains('/');
        let regex = if anchored || !path_scoped {
            format!("^{}$", glob_to_regex(body))
        } else {
            // Unanchored path patterns match at any directory depth.
            format!("^(?:.*/)?{}$", glob_to_regex(body))
        };

        Ok(IgnorePattern {
            raw: raw.to_string(),
            negation,
            directory_only,
            anchored,
            path_scoped,
            matcher: Regex::new(&regex)?,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn negation(&self) -> bool {
        self.negation
    }

    /// Does this pattern match the given normalized relative path?
    ///
    /// Directory-only patterns never match plain files; ancestor-directory
    /// matching is the matcher's concern, not the pattern's.
    pub fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        if self.directory_only && !is_dir {
            return false;
        }

        if self.anchored || self.path_scoped {
            self.matcher.is_match(rel_path)
        } else {
            let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
            self.matcher.is_match(basename)
        }
    }
}

/// Translate a glob body into an anchored-free regex fragment.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2);

    for c in glob.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c if "\\.+()[]{}^$|".contains(c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }

    regex
}

#[cfg(test)]
mod tests {
    use super::IgnorePattern;

    fn pattern(raw: &str) -> IgnorePattern {
        IgnorePattern::parse(raw).expect("pattern should compile")
    }

    #[test]
    fn basename_patterns_match_anywhere() {
        let p = pattern("*.log");

        assert!(p.matches("debug.log", false));
        assert!(p.matches("deep/nested/trace.log", false));
        assert!(!p.matches("changelog", false));
    }

    #[test]
    fn question_mark_matches_a_single_character() {
        let p = pattern("file?.txt");

        assert!(p.matches("file1.txt", false));
        assert!(!p.matches("file12.txt", false));
    }

    #[test]
    fn anchored_patterns_only_match_from_the_root() {
        let p = pattern("/build");

        assert!(p.matches("build", true));
        assert!(!p.matches("sub/build", true));
    }

    #[test]
    fn directory_only_patterns_skip_files() {
        let p = pattern("target/");

        assert!(p.matches("target", true));
        assert!(!p.matches("target", false));
    }

    #[test]
    fn path_scoped_patterns_match_at_any_depth() {
        let p = pattern("docs/*.md");

        assert!(p.matches("docs/readme.md", false));
        assert!(p.matches("sub/docs/notes.md", false));
        assert!(!p.matches("docs.md", false));
    }

    #[test]
    fn negation_flag_is_recorded() {
        let p = pattern("!important.log");

        assert!(p.negation());
        assert!(p.matches("important.log", false));
    }
}
