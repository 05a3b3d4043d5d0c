use anyhow::Result;
use clap::{Parser, Subcommand};
use strata::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "strata",
    version = "0.1.0",
    about = "A lightweight local version control system",
    long_about = "strata snapshots a working directory into immutable commits, \
    tracks branch pointers and a movable HEAD, and answers status/diff queries \
    against that history. Each commit stores full file copies.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Add files to the staging area")]
    Add {
        #[arg(help = "Files, directories or glob patterns to stage")]
        files: Vec<String>,
        #[arg(short = 'A', long, help = "Re-stage all tracked files")]
        all: bool,
    },
    #[command(name = "unstage", about = "Remove a file from the staging area")]
    Unstage {
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "commit", about = "Create a new commit from the staging area")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
        #[arg(short, long, help = "Stage all tracked files before committing")]
        all: bool,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(short, long, help = "Short two-column format")]
        short: bool,
    },
    #[command(name = "diff", about = "Show differences between commits and the working tree")]
    Diff {
        #[arg(index = 1, help = "First commit (defaults to HEAD)")]
        commit1: Option<String>,
        #[arg(index = 2, help = "Second commit (defaults to the working tree)")]
        commit2: Option<String>,
        #[arg(long, help = "Compare the staging area against HEAD")]
        cached: bool,
    },
    #[command(name = "branch", about = "List, create, delete or rename branches")]
    Branch {
        #[arg(index = 1, help = "Branch name to create")]
        name: Option<String>,
        #[arg(short, long, value_name = "NAME", help = "Delete the named branch")]
        delete: Option<String>,
        #[arg(
            short = 'm',
            long,
            num_args = 2,
            value_names = ["OLD", "NEW"],
            help = "Rename a branch"
        )]
        rename: Option<Vec<String>>,
    },
    #[command(name = "checkout", about = "Switch branches or restore a commit")]
    Checkout {
        #[arg(index = 1, help = "Branch name or commit id")]
        target: String,
        #[arg(short = 'b', long, help = "Create the branch at HEAD first")]
        create: bool,
        #[arg(short, long, help = "Discard uncommitted changes")]
        force: bool,
    },
    #[command(name = "revert", about = "Restore the working tree from a commit")]
    Revert {
        #[arg(index = 1)]
        commit: String,
        #[arg(long, help = "Also discard staged changes")]
        hard: bool,
    },
    #[command(name = "reset", about = "Reset HEAD state (soft, mixed or hard)")]
    Reset {
        #[arg(long, default_value = "mixed", help = "Reset mode")]
        mode: String,
    },
    #[command(name = "history", alias = "log", about = "Show commit history")]
    History {
        #[arg(short = 'n', long = "number", help = "Limit the number of commits shown")]
        number: Option<usize>,
        #[arg(long, help = "Condensed one-line format")]
        oneline: bool,
    },
    #[command(name = "graph", about = "Show the commit graph with branch labels")]
    Graph {
        #[arg(short = 'n', long = "number", help = "Limit the number of commits shown")]
        number: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    commands::configure_colors();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => commands::init::run(path.as_deref()),
        Commands::Add { files, all } => commands::add::run(files, *all),
        Commands::Unstage { file } => commands::add::unstage(file),
        Commands::Commit { message, all } => commands::commit::run(message, *all),
        Commands::Status { short } => commands::status::run(*short),
        Commands::Diff {
            commit1,
            commit2,
            cached,
        } => commands::diff::run(commit1.as_deref(), commit2.as_deref(), *cached),
        Commands::Branch {
            name,
            delete,
            rename,
        } => match (name, delete, rename) {
            (_, Some(name), _) => commands::branch::delete(name),
            (_, _, Some(names)) if names.len() == 2 => {
                commands::branch::rename(&names[0], &names[1])
            }
            (Some(name), None, None) => commands::branch::create(name),
            _ => commands::branch::list(),
        },
        Commands::Checkout {
            target,
            create,
            force,
        } => commands::checkout::run(target, *create, *force),
        Commands::Revert { commit, hard } => commands::revert::run(commit, *hard),
        Commands::Reset { mode } => commands::reset::run(mode),
        Commands::History { number, oneline } => commands::log::run(*number, *oneline),
        Commands::Graph { number } => commands::graph::run(*number),
    }
}
