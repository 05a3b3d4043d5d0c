//! Unified-format hunk assembly on top of the Myers edit script.

use crate::artifacts::diff::myers::{myers_diff, Edit};

/// Context lines shown around each change.
pub const CONTEXT_LINES: usize = 3;

/// Bytes sniffed for the binary heuristic.
const BINARY_SNIFF_LEN: usize = 8192;

/// A NUL byte within the sniff window marks content as binary.
pub fn is_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

/// One `@@`-delimited block of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Display lines, each prefixed with ` `, `+` or `-`.
    pub lines: Vec<String>,
}

impl std::fmt::Display for Hunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_count),
            format_range(self.new_start, self.new_count)
        )?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

fn format_range(start: usize, count: usize) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

/// Line-diff `old` against `new` and group the edit script into hunks with a
/// [`CONTEXT_LINES`]-wide window. Identical inputs yield no hunks.
pub fn unified_hunks(old: &str, new: &str) -> Vec<Hunk> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let edits = myers_diff(&old_lines, &new_lines);

    // Line numbers (1-based) on each side before a given edit is applied.
    let mut positions = Vec::with_capacity(edits.len());
    let (mut old_line, mut new_line) = (1usize, 1usize);
    for edit in &edits {
        positions.push((old_line, new_line));
        match edit {
            Edit::Delete(_) => old_line += 1,
            Edit::Insert(_) => new_line += 1,
            Edit::Equal(_) => {
                old_line += 1;
                new_line += 1;
            }
        }
    }

    let mut hunks = Vec::new();
    let mut cursor = 0;

    while let Some(first_change) = edits[cursor..]
        .iter()
        .position(|e| !matches!(e, Edit::Equal(_)))
        .map(|offset| cursor + offset)
    {
        let start = first_change.saturating_sub(CONTEXT_LINES).max(cursor);

        // Extend past subsequent changes whose context windows overlap.
        let mut last_change = first_change;
        let mut probe = first_change + 1;
        while probe < edits.len() {
            if !matches!(edits[probe], Edit::Equal(_)) {
                last_change = probe;
                probe += 1;
            } else if probe - last_change <= CONTEXT_LINES * 2 {
                probe += 1;
            } else {
                break;
            }
        }
        let end = (last_change + CONTEXT_LINES + 1).min(edits.len());

        hunks.push(build_hunk(&edits[start..end], positions[start]));
        cursor = end;
    }

    hunks
}

fn build_hunk(edits: &[Edit<&str>], (old_start, new_start): (usize, usize)) -> Hunk {
    let mut lines = Vec::with_capacity(edits.len());
    let (mut old_count, mut new_count) = (0usize, 0usize);

    for edit in edits {
        match edit {
            Edit::Delete(line) => {
                old_count += 1;
                lines.push(format!("-{line}"));
            }
            Edit::Insert(line) => {
                new_count += 1;
                lines.push(format!("+{line}"));
            }
            Edit::Equal(line) => {
                old_count += 1;
                new_count += 1;
                lines.push(format!(" {line}"));
            }
        }
    }

    Hunk {
        // An empty side renders its start as the line before (e.g. `-0,0`).
        old_start: if old_count == 0 { old_start - 1 } else { old_start },
        old_count,
        new_start: if new_count == 0 { new_start - 1 } else { new_start },
        new_count,
        lines,
    }
}

/// Count of (inserted, removed) lines between the two texts.
pub fn diff_stats(old: &str, new: &str) -> (usize, usize) {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    myers_diff(&old_lines, &new_lines)
        .iter()
        .fold((0, 0), |(added, removed), edit| match edit {
            Edit::Insert(_) => (added + 1, removed),
            Edit::Delete(_) => (added, removed + 1),
            Edit::Equal(_) => (added, removed),
        })
}
