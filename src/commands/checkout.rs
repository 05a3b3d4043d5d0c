use crate::areas::repository::CheckoutTarget;
use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(target: &str, create: bool, force: bool) -> Result<()> {
    let repository = open_repository()?;
    let outcome = repository.checkout(target, create, force)?;

    if outcome.created_branch {
        println!("Created new branch '{}'", target.green());
    }

    match &outcome.target {
        CheckoutTarget::Branch(branch) => match &outcome.previous_branch {
            Some(previous) if previous != branch => println!(
                "Switched from branch '{previous}' to '{}'",
                branch.to_string().cyan()
            ),
            _ => println!("Switched to branch '{}'", branch.to_string().cyan()),
        },
        CheckoutTarget::Commit(id) => {
            println!("{}", format!("Note: switching to '{id}'.").yellow());
            println!("You are in 'detached HEAD' state.");
            println!("To keep work made here, create a branch: strata checkout -b <name>");
        }
    }

    if !outcome.restore.failed.is_empty() {
        println!(
            "{} {} file(s) could not be restored",
            "warning:".yellow(),
            outcome.restore.failed.len()
        );
    }

    Ok(())
}
