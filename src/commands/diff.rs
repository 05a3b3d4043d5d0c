use crate::artifacts::commit::CommitId;
use crate::artifacts::diff::{DiffReport, DiffSource, FileChange};
use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(commit1: Option<&str>, commit2: Option<&str>, cached: bool) -> Result<()> {
    let repository = open_repository()?;

    let (from, to) = if cached {
        match repository.refs().resolve_head()? {
            Some(head) => (DiffSource::Commit(head), DiffSource::Stage),
            None => {
                // Nothing to compare against yet; list what is staged.
                for (path, entry) in repository.index().staged() {
                    println!("  {:<12} {}", entry.status.to_string().green(), path.display());
                }
                return Ok(());
            }
        }
    } else {
        match (commit1, commit2) {
            (Some(a), Some(b)) => (
                DiffSource::Commit(CommitId::try_parse(a)?),
                DiffSource::Commit(CommitId::try_parse(b)?),
            ),
            (Some(a), None) => (
                DiffSource::Commit(CommitId::try_parse(a)?),
                DiffSource::WorkingTree,
            ),
            _ => match repository.refs().resolve_head()? {
                Some(head) => (DiffSource::Commit(head), DiffSource::WorkingTree),
                None => {
                    println!("No commits yet. Nothing to diff.");
                    return Ok(());
                }
            },
        }
    };

    let report = repository.diff(&from, &to)?;
    render(&report);

    Ok(())
}

fn render(report: &DiffReport) {
    if report.is_empty() {
        println!("No differences found");
        return;
    }

    println!(
        "{}",
        format!("Comparing {} -> {}", report.from, report.to).bold()
    );

    for file in &report.files {
        let path = file.path.display();

        match &file.change {
            FileChange::Added { lines } => {
                println!("\n{}", format!("+++ New file: {path}").green());
                println!("    {}", format!("+{lines} lines").green());
            }
            FileChange::Deleted { lines } => {
                println!("\n{}", format!("--- Deleted file: {path}").red());
                println!("    {}", format!("-{lines} lines").red());
            }
            FileChange::Binary => {
                println!(
                    "\n{}",
                    format!("Binary files a/{path} and b/{path} differ").yellow()
                );
            }
            FileChange::Modified { hunks, .. } => {
                println!("\n{}", format!("diff --strata a/{path} b/{path}").bold());
                println!("{}", format!("--- a/{path}").bold());
                println!("{}", format!("+++ b/{path}").bold());
                for hunk in hunks {
                    render_hunk_lines(&hunk.to_string());
                }
            }
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  {} file(s) changed", report.files_changed());
    println!("  {}", format!("+{} insertions", report.added).green());
    println!("  {}", format!("-{} deletions", report.removed).red());
}

fn render_hunk_lines(rendered: &str) {
    for line in rendered.lines() {
        if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}
