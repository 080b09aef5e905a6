//! Command handlers.
//!
//! Each handler receives the composed [`CliContext`](crate::bootstrap::CliContext)
//! and performs one subcommand.

pub mod chat;
pub mod config;
pub mod delete;
pub mod list;
pub mod new;
pub mod show;
pub mod status;
