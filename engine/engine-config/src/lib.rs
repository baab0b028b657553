//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic for the
//! game runner and anything else that needs shared settings.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`CONNECT4_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! Command-line flags sit above all of these; the runner uses the loaded
//! values as its flag defaults.
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! CONNECT4_<SECTION>_<KEY>=value
//!
//! Examples:
//!     CONNECT4_COMMON_LOG_LEVEL=debug
//!     CONNECT4_COMMON_SEED=42
//!     CONNECT4_MCTS_ITERATIONS=5000
//!     CONNECT4_MCTS_MAX_DEPTH=20
//!     CONNECT4_GAME_GAMES=10
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
