//! Command handlers: thin renderers over the repository facade.
//!
//! Each handler opens the repository, invokes one facade operation and
//! prints its payload; no domain logic lives here.

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod graph;
pub mod init;
pub mod log;
pub mod reset;
pub mod revert;
pub mod status;

use crate::areas::repository::Repository;
use anyhow::Result;
use is_terminal::IsTerminal;

pub(crate) fn open_repository() -> Result<Repository> {
    let cwd = std::env::current_dir()?;
    Ok(Repository::open(&cwd)?)
}

/// Suppress colored output when stdout is not a terminal.
pub fn configure_colors() {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}
