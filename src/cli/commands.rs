//! Command handlers for the image cache CLI
//!
//! This module implements the command handlers that connect CLI arguments
//! to the [`CacheManager`].

use std::time::{Duration, Instant};

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::app::cache::stats::format_bytes;
use crate::app::cache::{CacheKey, CacheManager, DirectoryStatus, EntryState};
use crate::cli::{FetchArgs, GlobalArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Build the cache manager described by configuration and global flags
///
/// `--cache-dir` wins over `IMAGE_CACHE_DIR`, which wins over the config file.
pub async fn build_cache_manager(global: &GlobalArgs, config: &AppConfig) -> Result<CacheManager> {
    let (mut cache_config, client_config) = config.to_runtime_config();
    if let Some(dir) = &global.cache_dir {
        debug!("Cache directory set on the command line: {}", dir.display());
        cache_config.cache_root = Some(dir.clone());
    }

    CacheManager::with_http_client(cache_config, &client_config).await
}

/// Handle the fetch command
///
/// Fetches every URI concurrently and prints where each one was cached.
///
/// # Errors
///
/// Returns an error naming the number of failures if any URI could not be
/// cached.
pub async fn handle_fetch(cache: &CacheManager, args: FetchArgs, quiet: bool) -> Result<()> {
    let options = args.download_options();
    let start_time = Instant::now();

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message(format!("Fetching {} resources...", args.uris.len()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let fetches = args.uris.iter().map(|uri| {
        let options = options.clone();
        async move { (uri, cache.fetch(uri, options).await) }
    });
    let outcomes = join_all(fetches).await;
    spinner.finish_and_clear();

    let mut failed = 0;
    for (uri, outcome) in &outcomes {
        match &outcome.path {
            Some(path) => {
                let origin = match outcome.state {
                    EntryState::Hit => "cached",
                    _ => "downloaded",
                };
                match &outcome.checksum {
                    Some(md5) => println!("{} {} ({}, md5 {})", uri, path.display(), origin, md5),
                    None => println!("{} {} ({})", uri, path.display(), origin),
                }
            }
            None => {
                failed += 1;
                let reason = outcome.state.get_error().unwrap_or("unknown error");
                eprintln!("{} failed: {}", uri, reason);
            }
        }
        if let DirectoryStatus::Degraded { reason } = &outcome.directory {
            warn!("Cache directory problem while fetching {}: {}", uri, reason);
        }
    }

    info!(
        "Fetched {} resources in {:?}",
        outcomes.len(),
        start_time.elapsed()
    );

    if failed > 0 {
        return Err(AppError::generic(format!(
            "{} of {} resources could not be cached",
            failed,
            outcomes.len()
        )));
    }
    Ok(())
}

/// Handle the clear command
pub async fn handle_clear(cache: &CacheManager) -> Result<()> {
    cache.clear_cache().await?;
    println!("Cleared {}", cache.base_dir().await.display());
    Ok(())
}

/// Handle the size command
pub async fn handle_size(cache: &CacheManager) -> Result<()> {
    let size = cache.get_cache_size().await?;
    println!("{} ({} bytes)", format_bytes(size), size);
    Ok(())
}

/// Handle the remove command
pub async fn handle_remove(cache: &CacheManager, uris: &[String]) -> Result<()> {
    for uri in uris {
        cache.remove_cache_entry(uri).await?;
        println!("Removed {}", uri);
    }
    Ok(())
}

/// Handle the info command
pub async fn handle_info(cache: &CacheManager, json: bool) -> Result<()> {
    let stats = cache.get_cache_stats().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&stats)
            .map_err(|e| AppError::generic(format!("Failed to render statistics: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("💾 Cache Information");
    println!("===================");
    println!("Location: {}", stats.cache_root.display());
    println!("Cached files: {}", stats.cached_files_count);
    println!("Temporary files: {}", stats.temp_files_count);
    println!("Cache size: {}", stats.format_cache_size());
    Ok(())
}

/// Handle the clean command
pub async fn handle_clean(cache: &CacheManager) -> Result<()> {
    let removed = cache.remove_orphaned_temp_files().await?;
    if removed == 0 {
        println!("No temporary files to remove");
    } else {
        println!("🗑️  Removed {} temporary files", removed);
    }
    Ok(())
}

/// Handle the key command
pub async fn handle_key(cache: &CacheManager, uri: &str) -> Result<()> {
    let key = CacheKey::derive(uri);
    println!("Key:  {}", key);
    println!("Path: {}", cache.get_file_path(uri).await.display());
    Ok(())
}
