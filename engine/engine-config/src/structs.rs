//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_max_depth() -> u32 {
    defaults::max_depth()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_player_1() -> String {
    defaults::player_1().into()
}
fn d_player_2() -> String {
    defaults::player_2().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub game: GameConfig,
}

/// Settings shared by every component
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Fixed RNG seed for reproducible games; entropy when unset
    pub seed: Option<u64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            seed: None,
        }
    }
}

/// Search settings for MCTS agents
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    /// Rollout depth cap, 0 for unbounded
    #[serde(default = "d_max_depth")]
    pub max_depth: u32,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            max_depth: defaults::max_depth(),
            exploration: defaults::exploration(),
        }
    }
}

/// Match settings for the game runner
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Games per run; the first mover alternates between games
    #[serde(default = "d_games")]
    pub games: u32,
    #[serde(default = "d_player_1")]
    pub player_1: String,
    #[serde(default = "d_player_2")]
    pub player_2: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            player_1: defaults::player_1().into(),
            player_2: defaults::player_2().into(),
        }
    }
}
