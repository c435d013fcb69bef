//! Command implementations, one module per subcommand.

pub mod add_vault;
pub mod bulk_load;
pub mod completions;
pub mod delete_vault;
pub mod get_secret;
pub mod list_mounts;
pub mod list_secrets;
pub mod list_vaults;

use serde::Serialize;

use crate::cli::machine::Report;
use crate::cli::output;

/// Result of a command that only reports a status line.
#[derive(Debug, Serialize)]
pub struct MessageReport {
    pub message: String,
}

impl Report for MessageReport {
    fn print_console(&self) {
        output::success(&self.message);
    }
}
