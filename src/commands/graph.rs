use crate::commands::open_repository;
use anyhow::Result;
use colored::Colorize;

pub fn run(limit: Option<usize>) -> Result<()> {
    let repository = open_repository()?;
    let report = repository.graph()?;

    if report.nodes.is_empty() {
        println!("No commits yet");
        return Ok(());
    }

    println!("{}\n", "=== COMMIT GRAPH ===".bold());

    let shown = limit.unwrap_or(report.nodes.len()).min(report.nodes.len());
    for (position, node) in report.nodes.iter().take(shown).enumerate() {
        let mut labels = Vec::new();

        if Some(&node.commit.id) == report.head.as_ref() {
            match &report.branch {
                Some(branch) => labels.push(format!("HEAD -> {branch}").cyan().to_string()),
                None => labels.push("HEAD".yellow().to_string()),
            }
        }
        for branch in &node.branches {
            if report.branch.as_ref() != Some(branch)
                || Some(&node.commit.id) != report.head.as_ref()
            {
                labels.push(branch.to_string().green().to_string());
            }
        }

        let label_suffix = if labels.is_empty() {
            String::new()
        } else {
            format!(" ({})", labels.join(", "))
        };

        println!(
            "{}{}",
            format!("* {}", node.commit.id).yellow(),
            label_suffix
        );
        println!("  {}", node.commit.short_message());
        println!(
            "  {}",
            format!("{} | {}", node.commit.author.name, node.commit.timestamp).dimmed()
        );
        if position < shown - 1 {
            println!("  |");
        }
    }

    println!("\n{}", "Statistics:".bold());
    println!("  Total commits: {}", report.total_commits());
    println!("  Branches: {}", report.branch_count);
    if !report.orphaned.is_empty() {
        println!(
            "  {}",
            format!("Orphaned commits: {}", report.orphaned.len()).yellow()
        );
    }

    Ok(())
}
