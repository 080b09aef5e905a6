//! Table formatting utilities for CLI output.

use chrono::{DateTime, Local, Utc};

/// Truncates a string to at most `max_len` characters, adding "..." if needed.
///
/// Newlines are flattened to spaces so the result fits one table row.
///
/// # Examples
///
/// ```rust
/// use murmur_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_len {
        flat
    } else {
        let kept: String = flat.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Render a timestamp in local time for table display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
