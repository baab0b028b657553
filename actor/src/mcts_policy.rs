//! MCTS-based policy using random rollouts
//!
//! Wraps the search in `mcts` behind the runner's [`Policy`] trait and keeps
//! the searched subtree so the next turn can start from it.

use anyhow::{Context, Result};
use games_connect4::{Action, Board, Player};
use mcts::{run_mcts, MctsConfig, SavedState, SearchStats};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::policy::Policy;

/// MCTS-based policy
#[derive(Debug)]
pub struct MctsPolicy {
    /// MCTS configuration
    config: MctsConfig,
    /// RNG for expansion order and rollouts
    rng: ChaCha20Rng,
    /// Stats from the last search, collected by the runner
    last_stats: Option<SearchStats>,
}

impl MctsPolicy {
    pub fn new() -> Self {
        Self {
            config: MctsConfig::default(),
            rng: ChaCha20Rng::from_entropy(),
            last_stats: None,
        }
    }

    /// Create with a specific seed for determinism
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: MctsConfig::default(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            last_stats: None,
        }
    }

    /// Set the MCTS configuration
    pub fn with_config(mut self, config: MctsConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for MctsPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for MctsPolicy {
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(Action, Option<SavedState>)> {
        let (result, subtree) = run_mcts(
            board,
            player,
            saved_state,
            self.config.clone(),
            &mut self.rng,
        )
        .context("MCTS search failed")?;

        debug!(
            action = result.action,
            visits = result.visits,
            value = result.value,
            iterations = result.stats.iterations,
            subtree_nodes = subtree.len(),
            "MCTS selected action"
        );

        self.last_stats = Some(result.stats);
        Ok((result.action, Some(subtree)))
    }

    fn take_stats(&mut self) -> Option<SearchStats> {
        self.last_stats.take()
    }
}
