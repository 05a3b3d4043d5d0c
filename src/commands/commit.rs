use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

const LISTED_FILES_LIMIT: usize = 10;

pub fn run(message: &str, all: bool) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.commit(message, all)?;

    let location = match &outcome.branch {
        Some(branch) => branch.to_string(),
        None => "detached HEAD".to_string(),
    };
    println!(
        "[{}] {}: {}",
        location.cyan(),
        outcome.commit.id.to_string().yellow(),
        outcome.commit.short_message()
    );
    println!("{} file(s) changed", outcome.commit.files.len());

    if !outcome.commit.files.is_empty() {
        println!("\nCommitted files:");
        for file in outcome.commit.files.iter().take(LISTED_FILES_LIMIT) {
            println!("  {}", file.display());
        }
        if outcome.commit.files.len() > LISTED_FILES_LIMIT {
            println!(
                "  ... and {} more",
                outcome.commit.files.len() - LISTED_FILES_LIMIT
            );
        }
    }

    if !outcome.skipped.is_empty() {
        println!(
            "{} {} file(s) could not be read and were left out",
            "warning:".yellow(),
            outcome.skipped.len()
        );
    }

    Ok(())
}
