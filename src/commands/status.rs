use crate::areas::index::EntryStatus;
use crate::artifacts::status::StatusReport;
use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

const UNTRACKED_LIMIT: usize = 20;

pub fn run(short: bool) -> Result<()> {
    let repository = open_repository()?;
    let report = repository.status()?;

    if short {
        render_short(&report);
    } else {
        render_long(&report);
    }

    Ok(())
}

fn render_short(report: &StatusReport) {
    for (path, status) in &report.staged {
        let staged_mark = match status {
            EntryStatus::Added => 'A',
            EntryStatus::Modified => 'M',
        };
        let worktree_mark = if report.unstaged_modified.contains(path) {
            'M'
        } else {
            ' '
        };
        println!("{staged_mark}{worktree_mark} {}", path.display());
    }

    for path in &report.unstaged_modified {
        if !report.staged.contains_key(path) {
            println!(" M {}", path.display());
        }
    }
    for path in &report.staged_deleted {
        println!("D  {}", path.display());
    }
    for path in &report.deleted {
        println!(" D {}", path.display());
    }
    for path in report.untracked.iter().take(UNTRACKED_LIMIT) {
        println!("?? {}", path.display());
    }
    if report.untracked.len() > UNTRACKED_LIMIT {
        println!(
            "... and {} more untracked files",
            report.untracked.len() - UNTRACKED_LIMIT
        );
    }
}

fn render_long(report: &StatusReport) {
    match (&report.branch, &report.head) {
        (Some(branch), _) => println!("On branch {}", branch.to_string().cyan()),
        (None, Some(head)) => {
            println!("HEAD detached at {}", head.to_string().yellow())
        }
        (None, None) => println!("Not currently on any branch"),
    }

    if report.head.is_none() {
        println!("\nNo commits yet");
    }

    if report.has_staged_changes() {
        println!("\n{}", "Changes to be committed:".green());
        println!("  (use 'strata unstage <file>' to unstage)");
        for (path, status) in &report.staged {
            let marker = match status {
                EntryStatus::Added => "new file:",
                EntryStatus::Modified => "modified:",
            };
            println!("  {:<12} {}", marker.green(), path.display());
        }
        for path in &report.staged_deleted {
            println!("  {:<12} {}", "deleted:".green(), path.display());
        }
    }

    if !report.unstaged_modified.is_empty() || !report.deleted.is_empty() {
        println!("\n{}", "Changes not staged for commit:".red());
        println!("  (use 'strata add <file>' to stage)");
        for path in &report.unstaged_modified {
            println!("  {:<12} {}", "modified:".red(), path.display());
        }
        for path in &report.deleted {
            println!("  {:<12} {}", "deleted:".red(), path.display());
        }
    }

    if !report.untracked.is_empty() {
        println!("\n{}", "Untracked files:".red());
        println!("  (use 'strata add <file>' to track)");
        for path in report.untracked.iter().take(UNTRACKED_LIMIT) {
            println!("  {}", path.display());
        }
        if report.untracked.len() > UNTRACKED_LIMIT {
            println!("  ... and {} more", report.untracked.len() - UNTRACKED_LIMIT);
        }
    }

    if report.is_clean() {
        println!("\n{}", "Nothing to commit, working tree clean".green());
    }
}
