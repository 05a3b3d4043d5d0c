use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(limit: Option<usize>, oneline: bool) -> Result<()> {
    let repository = open_repository()?;
    let report = repository.history(limit)?;

    if report.commits.is_empty() {
        println!("No commits yet");
        return Ok(());
    }

    let head = report.head.as_ref();
    let branch_label = report
        .branch
        .as_ref()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "detached".to_string());

    for (position, commit) in report.commits.iter().enumerate() {
        let at_head = Some(&commit.id) == head;

        if oneline {
            let decoration = if at_head {
                format!(" ({})", branch_label.cyan())
            } else {
                String::new()
            };
            println!(
                "{}{} {}",
                commit.id.to_string().yellow(),
                decoration,
                commit.short_message()
            );
            continue;
        }

        let decoration = if at_head {
            format!(" {}", format!("(HEAD -> {branch_label})").yellow())
        } else {
            String::new()
        };
        println!("{}{}", format!("commit {}", commit.id).yellow(), decoration);
        if let Some(parent) = &commit.parent {
            println!("Parent: {parent}");
        }
        println!("Author: {}", commit.author);
        println!("Date:   {}", commit.timestamp);
        println!();
        for line in commit.message.lines() {
            println!("    {line}");
        }
        println!("\n    {} file(s) changed", commit.files.len());

        if position < report.commits.len() - 1 {
            println!();
        }
    }

    Ok(())
}
