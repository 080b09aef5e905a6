//! CLI entry point - the composition root.
//!
//! Bootstrap wires the infrastructure together; command dispatch routes to
//! handlers, which only see the resulting `CliContext`.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use murmur_cli::error::exit_code_for;
use murmur_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig {
        db_path: cli.db,
        model_url: cli.model_url,
    };
    let ctx = bootstrap(config).await?;

    match command {
        Commands::Status => handlers::status::execute(&ctx).await?,
        Commands::New => handlers::new::execute(&ctx).await?,
        Commands::List { json } => handlers::list::execute(&ctx, json).await?,
        Commands::Show { id } => handlers::show::execute(&ctx, id).await?,
        Commands::Delete { id } => handlers::delete::execute(&ctx, id).await?,
        Commands::Chat { id } => handlers::chat::execute(&ctx, id).await?,
        Commands::Config { command } => handlers::config::execute(&ctx, command).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before parsing so `.env` can supply
    // MURMUR_MODEL_URL.
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}
