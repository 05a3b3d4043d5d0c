use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(files: &[String], all: bool) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.add(files, all)?;

    if !outcome.staged.is_empty() {
        println!("Added {} file(s) to the staging area", outcome.staged.len());
    }
    if !outcome.ignored.is_empty() {
        println!("Ignored {} file(s)", outcome.ignored.len());
    }
    for (path, reason) in &outcome.failed {
        eprintln!("{} {}: {}", "error:".red(), path.display(), reason);
    }
    if outcome.staged.is_empty() && outcome.ignored.is_empty() && outcome.failed.is_empty() {
        println!("No files added");
    }

    if !outcome.failed.is_empty() {
        anyhow::bail!("failed to add {} file(s)", outcome.failed.len());
    }

    Ok(())
}

pub fn unstage(file: &str) -> Result<()> {
    let repository = open_repository()?;
    let path = repository.unstage(file)?;

    println!("Unstaged '{}'", path.display());
    Ok(())
}
