//! connect4 - Connect Four against humans, a random agent or an MCTS agent
//!
//! Asks for (or takes on the command line) a game mode, then plays the
//! configured number of games, swapping the first mover after each game.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use games_connect4::Player;
use tracing::info;

mod actor;
mod config;
mod mcts_policy;
mod policy;

use crate::actor::{Contestant, GameRunner};
use crate::config::{prompt_mode, Config, GameMode};
use crate::mcts_policy::MctsPolicy;
use crate::policy::{HumanPolicy, RandomPolicy};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn mcts_player(config: &Config, seed: Option<u64>) -> MctsPolicy {
    let policy = match seed {
        Some(seed) => MctsPolicy::with_seed(seed),
        None => MctsPolicy::new(),
    };
    policy.with_config(config.mcts_config())
}

fn random_player(seed: Option<u64>) -> RandomPolicy {
    seed.map_or_else(RandomPolicy::new, RandomPolicy::with_seed)
}

/// Seat two contestants for `mode`. Agents get distinct seeds derived from `seed`.
fn contestants(config: &Config, mode: GameMode) -> [Contestant; 2] {
    let seed_for = |offset: u64| config.seed().map(|seed| seed.wrapping_add(offset));
    let (first, second) = (config.player_1.as_str(), config.player_2.as_str());

    match mode {
        GameMode::Pvp => [
            Contestant::new(first, HumanPolicy::stdin()),
            Contestant::new(second, HumanPolicy::stdin()),
        ],
        GameMode::Pva => [
            Contestant::new(first, HumanPolicy::stdin()),
            Contestant::new(second, mcts_player(config, seed_for(1))),
        ],
        GameMode::Ava => [
            Contestant::new(first, mcts_player(config, seed_for(0))),
            Contestant::new(second, mcts_player(config, seed_for(1))),
        ],
        GameMode::Avr => [
            Contestant::new(first, mcts_player(config, seed_for(0))),
            Contestant::new(second, random_player(seed_for(1))),
        ],
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let mode = match config.mode {
        Some(mode) => mode,
        None => prompt_mode(&mut io::stdin(), &mut io::stdout())?,
    };

    info!(
        mode = ?mode,
        games = config.games,
        iterations = config.iterations,
        max_depth = config.max_depth,
        exploration = config.exploration,
        seed = ?config.seed(),
        "Starting match"
    );

    let mut contestants = contestants(&config, mode);
    let mut runner = GameRunner::new(io::stdout());
    let records = runner.play_match(&mut contestants, config.games)?;
    runner.into_inner().flush()?;

    // Contestants swap seats every game
    let mut wins = [0usize; 2];
    let mut draws = 0;
    for (game, record) in records.iter().enumerate() {
        match record.outcome.winner() {
            Some(winner) => {
                let seat = usize::from(winner == Player::Two);
                wins[seat ^ (game % 2)] += 1;
            }
            None => draws += 1,
        }
    }
    let [first_wins, second_wins] = wins;

    info!(first_wins, second_wins, draws, "Match complete");
    println!(
        "{}: {} wins, {}: {} wins, {} draws",
        contestants[0].name, first_wins, contestants[1].name, second_wins, draws
    );

    Ok(())
}
