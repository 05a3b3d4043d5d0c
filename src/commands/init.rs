use crate::areas::repository::Repository;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(path: Option<&str>) -> Result<()> {
    let root = match path {
        Some(path) => {
            std::fs::create_dir_all(path)?;
            PathBuf::from(path)
        }
        None => std::env::current_dir()?,
    };

    let outcome = Repository::init(&root)?;

    if outcome.created {
        println!(
            "Initialized empty strata repository in {}",
            outcome.metadata_root.display()
        );
        println!("Default branch: {}", outcome.default_branch.cyan());
    } else {
        println!(
            "Repository already initialized in {}",
            outcome.metadata_root.display()
        );
    }

    Ok(())
}
