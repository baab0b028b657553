//! Configuration for the game runner
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::policy::ReadLine;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_games() -> u32 {
    CENTRAL_CONFIG.game.games
}

fn default_player_1() -> String {
    CENTRAL_CONFIG.game.player_1.clone()
}

fn default_player_2() -> String {
    CENTRAL_CONFIG.game.player_2.clone()
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.mcts.iterations
}

fn default_max_depth() -> u32 {
    CENTRAL_CONFIG.mcts.max_depth
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.mcts.exploration
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

/// Who plays whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameMode {
    /// Player vs. player
    Pvp,
    /// Player vs. agent
    Pva,
    /// Agent vs. agent
    Ava,
    /// Agent vs. random agent
    Avr,
}

impl GameMode {
    /// Mode for the numbers offered by the interactive menu.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(GameMode::Pvp),
            1 => Some(GameMode::Pva),
            2 => Some(GameMode::Ava),
            3 => Some(GameMode::Avr),
            _ => None,
        }
    }
}

/// Ask for a mode on the terminal when none was given on the command line.
pub fn prompt_mode<R: ReadLine, W: Write>(input: &mut R, output: &mut W) -> Result<GameMode> {
    write!(
        output,
        "Select mode:  \n 0 = player vs. player \n 1 = player vs. agent \n 2 = agent vs. agent \n 3 = agent vs. random agent \n"
    )?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read mode")? == 0 {
        bail!("Input closed before a mode was selected");
    }

    line.trim()
        .parse()
        .ok()
        .and_then(GameMode::from_index)
        .ok_or_else(|| {
            anyhow!("Incorrect mode selected. Please select valid mode (0, 1, 2, or 3)")
        })
}

#[derive(Parser, Debug, Clone)]
#[command(name = "connect4")]
#[command(about = "Connect Four with a Monte Carlo Tree Search agent")]
#[command(
    long_about = "Plays Connect Four between humans, a uniform random agent and an MCTS agent.
The first mover alternates between games.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Game mode; prompts for one when omitted
    #[arg(long, value_enum)]
    pub mode: Option<GameMode>,

    /// Number of games to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Name of the first contestant
    #[arg(long, default_value_t = default_player_1())]
    pub player_1: String,

    /// Name of the second contestant
    #[arg(long, default_value_t = default_player_2())]
    pub player_2: String,

    /// MCTS iterations per move
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// Rollout depth limit (0 for unbounded)
    #[arg(long, default_value_t = default_max_depth())]
    pub max_depth: u32,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// RNG seed for reproducible agents (falls back to config, then entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.player_1.trim().is_empty() || self.player_2.trim().is_empty() {
            return Err(anyhow!("player names cannot be empty"));
        }

        if self.iterations == 0 {
            return Err(anyhow!("iterations must be greater than 0"));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Search settings handed to every MCTS player.
    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::default()
            .with_iterations(self.iterations)
            .with_max_depth((self.max_depth > 0).then_some(self.max_depth))
            .with_exploration(self.exploration)
    }

    /// Seed from the command line, else from config.toml / env.
    pub fn seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.common.seed)
    }
}
