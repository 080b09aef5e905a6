//! Status command handler.

use anyhow::Result;
use murmur_core::{AvailabilityState, classify};

use crate::bootstrap::CliContext;

/// Probe the model server and report whether chat can be used.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let signal = ctx.model.check_availability().await;
    let state = classify(&signal);

    println!("Model server: {}", ctx.settings.effective_model_url());
    for line in report(&state) {
        println!("{line}");
    }
    Ok(())
}

/// Lines describing an availability state.
pub fn report(state: &AvailabilityState) -> Vec<String> {
    if state.is_available() {
        return vec!["✓ Ready to chat".to_string()];
    }
    let mut lines = vec![
        format!("✗ {}", state.title()),
        format!("  {}", state.description()),
    ];
    if state.can_recheck() {
        lines.push("  Run `murmur status` again to re-check.".to_string());
    }
    lines
}
