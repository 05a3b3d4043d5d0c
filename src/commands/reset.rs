use crate::areas::repository::ResetMode;
use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(mode: &str) -> Result<()> {
    let mode = match mode {
        "soft" => ResetMode::Soft,
        "mixed" => ResetMode::Mixed,
        "hard" => ResetMode::Hard,
        other => anyhow::bail!("unknown reset mode '{other}' (valid modes: soft, mixed, hard)"),
    };

    let repository = open_repository()?;
    let outcome = repository.reset(mode)?;

    println!("Reset HEAD to {} ({})", outcome.head, outcome.mode);
    match outcome.mode {
        ResetMode::Soft => println!("Staging area and working directory preserved"),
        ResetMode::Mixed => println!("Staging area cleared, working directory preserved"),
        ResetMode::Hard => {
            println!("{}", "All changes discarded".red());
            if let Some(restore) = &outcome.restore {
                println!("Restored {} file(s)", restore.restored.len());
            }
        }
    }

    Ok(())
}
