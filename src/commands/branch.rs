use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn create(name: &str) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.create_branch(name)?;

    println!(
        "Created branch '{}' at {}",
        outcome.name.to_string().green(),
        outcome.at
    );
    Ok(())
}

pub fn delete(name: &str) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.delete_branch(name)?;

    println!("Deleted branch '{}'", outcome.name.to_string().red());
    Ok(())
}

pub fn rename(old: &str, new: &str) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.rename_branch(old, new)?;

    println!("Renamed branch '{}' to '{}'", outcome.old, outcome.new);
    if outcome.head_followed {
        println!("HEAD now points at '{}'", outcome.new.to_string().cyan());
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.list_branches()?;

    if outcome.branches.is_empty() {
        println!("No branches yet");
        return Ok(());
    }

    println!("{}", "Branches:".bold());
    for branch in &outcome.branches {
        if Some(branch) == outcome.current.as_ref() {
            println!("{} (current)", format!("* {branch}").green());
        } else {
            println!("  {branch}");
        }
    }

    if let Some(head) = &outcome.detached_at {
        println!(
            "\n{}",
            format!("Currently in detached HEAD state at {head}").yellow()
        );
    }

    Ok(())
}
