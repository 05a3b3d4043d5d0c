use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(commit: &str, hard: bool) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.revert(commit, hard)?;

    println!(
        "{}",
        format!("Reverted to commit {}", outcome.commit.id).green()
    );
    println!("Message: {}", outcome.commit.short_message());
    println!("Restored {} file(s)", outcome.restore.restored.len());

    if !outcome.restore.failed.is_empty() {
        println!(
            "{}",
            format!(
                "Failed to restore {} file(s)",
                outcome.restore.failed.len()
            )
            .red()
        );
    }

    if outcome.hard {
        println!(
            "{}",
            "Hard revert performed, staged changes discarded".yellow()
        );
    } else {
        println!("Soft revert, staging area preserved");
    }

    Ok(())
}
