//! Command-line interface components
//!
//! This module contains CLI-specific code for the image cache binary:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FetchArgs, GlobalArgs};
pub use commands::{
    build_cache_manager, handle_clean, handle_clear, handle_fetch, handle_info, handle_key,
    handle_remove, handle_size,
};
