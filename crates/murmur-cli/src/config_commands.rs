//! Configuration management subcommands.

use clap::Subcommand;

/// Settings command variants.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all current settings and data paths
    Show,
    /// Change one setting; an empty value resets it to its default
    Set {
        /// One of: model_url, model_name, reply_instructions,
        /// summary_instructions, request_timeout_secs
        key: String,
        /// New value
        value: String,
    },
}
