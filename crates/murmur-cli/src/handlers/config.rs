//! Config command handler.
//!
//! `config set` edits the stored settings; command-line overrides never
//! reach the database.

use anyhow::Result;
use murmur_core::paths::DATA_DIR_ENV;
use murmur_core::{Settings, SettingsUpdate, data_root, validate_settings};

use crate::bootstrap::CliContext;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(ctx).await,
        ConfigCommand::Set { key, value } => set(ctx, &key, &value).await,
    }
}

async fn show(ctx: &CliContext) -> Result<()> {
    let stored = ctx.repos.settings.load().await.map_err(CliError::from)?;

    println!("Settings:");
    for (key, value) in settings_lines(&stored) {
        println!("  {key:<22} {value}");
    }
    if ctx.settings.model_url != stored.model_url {
        println!(
            "  (model_url overridden for this run: {})",
            ctx.settings.effective_model_url()
        );
    }

    println!();
    match data_root() {
        Ok(root) => println!(
            "Data directory: {} (set {DATA_DIR_ENV} to move it)",
            root.display()
        ),
        Err(e) => println!("Data directory: unavailable ({e})"),
    }
    Ok(())
}

async fn set(ctx: &CliContext, key: &str, value: &str) -> Result<()> {
    let update = SettingsUpdate::from_key_value(key, value).map_err(CliError::from)?;
    let settings = apply_update(
        ctx.repos.settings.load().await.map_err(CliError::from)?,
        &update,
    )?;
    ctx.repos
        .settings
        .save(&settings)
        .await
        .map_err(CliError::from)?;

    if value.is_empty() {
        println!("✓ Reset {key} to its default");
    } else {
        println!("✓ Set {key}");
    }
    Ok(())
}

/// Merge an update into stored settings, rejecting an invalid result.
pub fn apply_update(mut settings: Settings, update: &SettingsUpdate) -> Result<Settings, CliError> {
    settings.merge(update);
    validate_settings(&settings)?;
    Ok(settings)
}

/// Key/value pairs shown by `config show`, defaults filled in.
pub fn settings_lines(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("model_url", settings.effective_model_url().to_string()),
        (
            "model_name",
            settings
                .model_name
                .clone()
                .unwrap_or_else(|| "(server default)".to_string()),
        ),
        (
            "reply_instructions",
            settings.effective_reply_instructions().to_string(),
        ),
        (
            "summary_instructions",
            settings.effective_summary_instructions().to_string(),
        ),
        (
            "request_timeout_secs",
            settings.effective_request_timeout_secs().to_string(),
        ),
    ]
}
