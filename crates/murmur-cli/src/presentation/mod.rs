//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

pub mod stream;
pub mod tables;

// Re-export commonly used items
pub use stream::TerminalEmitter;
pub use tables::{format_timestamp, print_separator, truncate_string};
