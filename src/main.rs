//! Chatboard - Gemini chat page and SQLite bulletin board
//!
#![doc = "Main entry point for the Chatboard application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatboard::cli::{Cli, Commands};
use chatboard::commands;
use chatboard::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { .. } => {
            tracing::info!("Starting chat app");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Board { .. } => {
            tracing::info!("Starting bulletin board app");
            commands::board::run_board(config).await?;
            Ok(())
        }
        Commands::Auth => {
            tracing::info!("Starting API key setup");
            commands::auth::authenticate()?;
            Ok(())
        }
        Commands::Posts(args) => {
            tracing::debug!("Starting posts command");
            commands::posts::handle_posts(&config, args.command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "chatboard=debug"
    } else {
        "chatboard=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
