//! Image cache CLI application
//!
//! Command-line interface for fetching remote resources into a local disk
//! cache and administering that cache.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use image_cache::cli::{
    build_cache_manager, handle_clean, handle_clear, handle_fetch, handle_info, handle_key,
    handle_remove, handle_size, Cli, Commands,
};
use image_cache::config::AppConfig;
use image_cache::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("image_cache v{} starting", env!("CARGO_PKG_VERSION"));

    let cache = build_cache_manager(&cli.global, &config).await?;

    match cli.command {
        Commands::Fetch(args) => handle_fetch(&cache, args, cli.global.quiet).await,
        Commands::Clear => handle_clear(&cache).await,
        Commands::Size => handle_size(&cache).await,
        Commands::Remove { uris } => handle_remove(&cache, &uris).await,
        Commands::Info { json } => handle_info(&cache, json).await,
        Commands::Clean => handle_clean(&cache).await,
        Commands::Key { uri } => handle_key(&cache, &uri).await,
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Without a verbosity flag the level from the config file applies.
/// `RUST_LOG` directives are honoured on top.
fn init_logging(cli: &Cli, config: &AppConfig) {
    let default_level = config
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::WARN);
    let log_level = cli.log_level(default_level);

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("image_cache={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
