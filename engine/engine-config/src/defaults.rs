//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time, so the binary and the
//! checked-in example config can never disagree.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    game: GameDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    iterations: u32,
    max_depth: u32,
    exploration: f64,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    games: u32,
    player_1: String,
    player_2: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn iterations() -> u32 {
    DEFAULTS.mcts.iterations
}
pub fn max_depth() -> u32 {
    DEFAULTS.mcts.max_depth
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}

// Game
pub fn games() -> u32 {
    DEFAULTS.game.games
}
pub fn player_1() -> &'static str {
    &DEFAULTS.game.player_1
}
pub fn player_2() -> &'static str {
    &DEFAULTS.game.player_2
}
