//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the murmur chat shell.
#[derive(Parser)]
#[command(name = "murmur")]
#[command(about = "Chat with a local language model")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Use this database file instead of the default location
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Base URL of the model server for this invocation
    #[arg(long = "model-url", env = "MURMUR_MODEL_URL", global = true)]
    pub model_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
