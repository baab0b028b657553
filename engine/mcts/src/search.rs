//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Traverse tree using UCT to find a node that is not fully expanded
//! 2. Expansion: Add one random unexpanded child to that node
//! 3. Simulation: Play a random game from the new child
//! 4. Backpropagation: Update statistics along the path

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use games_connect4::{Action, Board, MoveError, Player};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::node::{MctsNode, NodeId};
use crate::simulation::{rollout, RolloutOutcome};
use crate::tree::MctsTree;

/// Tree carried from one of the agent's turns to the next.
pub type SavedState = MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Node {0:?} has no unexpanded actions left")]
    FullyExpanded(NodeId),

    #[error("Search cancelled before any move was explored")]
    Cancelled,

    #[error("Illegal move during search: {0}")]
    Move(#[from] MoveError),
}

/// Counters and timings collected during one search call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Iterations run by this call (excludes visits inherited from a reused tree)
    pub iterations: u32,
    pub select_us: u64,
    pub expand_us: u64,
    pub simulate_us: u64,
    pub backprop_us: u64,
    /// Simulations that landed on an already finished game
    pub terminal_hits: u32,
    /// Rollouts cut off by the depth limit
    pub truncated_rollouts: u32,
    pub rollout_moves: u64,
    /// Whether the move was an immediate win found among the root's children
    pub forced_win: bool,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best action to take
    pub action: Action,

    /// Root child reached by `action`
    pub child: NodeId,

    /// Visit count of the chosen child
    pub visits: u32,

    /// Mean value of the chosen child, from the searching player's perspective
    pub value: f32,

    pub stats: SearchStats,
}

/// MCTS search state.
pub struct MctsSearch {
    tree: MctsTree,
    config: MctsConfig,
    agent: Player,
    cancel: Option<Arc<AtomicBool>>,
    stats: SearchStats,
}

impl MctsSearch {
    /// Create a new MCTS search for `agent` to move on `board`.
    ///
    /// `saved_state` is reused when its root holds the same board and was
    /// reached by the opponent's move; otherwise a fresh root is built.
    pub fn new(
        board: &Board,
        agent: Player,
        saved_state: Option<SavedState>,
        config: MctsConfig,
    ) -> Result<Self, SearchError> {
        if board.legal_actions().is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        let tree = match saved_state {
            Some(tree) if Self::matches(&tree, board, agent) => tree,
            Some(_) => {
                debug!(agent = %agent, "Saved state does not match board, starting fresh");
                MctsTree::new(board.clone(), agent.opponent())
            }
            None => MctsTree::new(board.clone(), agent.opponent()),
        };

        Ok(Self {
            tree,
            config,
            agent,
            cancel: None,
            stats: SearchStats::default(),
        })
    }

    fn matches(tree: &MctsTree, board: &Board, agent: Player) -> bool {
        let root = tree.get(tree.root());
        root.board == *board && root.player == agent.opponent()
    }

    /// Stop between iterations once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run the search until the root has `config.iterations` visits.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        let root_id = self.tree.root();
        let inherited = self.tree.get(root_id).visits;
        let remaining = self.config.iterations.saturating_sub(inherited);

        let mut cancelled = false;
        for _ in 0..remaining {
            if self.is_cancelled() {
                debug!(
                    completed = self.stats.iterations,
                    remaining = remaining - self.stats.iterations,
                    "MCTS search cancelled"
                );
                cancelled = true;
                break;
            }
            self.iterate(rng)?;
        }

        let (child, forced_win) = match self.forced_win() {
            Some(child) => (child, true),
            None => match self.tree.best_child() {
                Some(child) => (child, false),
                None if cancelled => return Err(SearchError::Cancelled),
                None => return Err(SearchError::NoLegalMoves),
            },
        };
        self.stats.forced_win = forced_win;

        let node = self.tree.get(child);
        let action = node.action.ok_or(SearchError::NoLegalMoves)?;
        let stats = self.stats.clone();

        debug!(
            action,
            inherited,
            iterations = stats.iterations,
            child_visits = node.visits,
            win_rate = node.win_rate(),
            forced_win,
            terminal_hits = stats.terminal_hits,
            truncated = stats.truncated_rollouts,
            rollout_moves = stats.rollout_moves,
            select_us = stats.select_us,
            expand_us = stats.expand_us,
            simulate_us = stats.simulate_us,
            backprop_us = stats.backprop_us,
            "MCTS search complete"
        );

        Ok(SearchResult {
            action,
            child,
            visits: node.visits,
            value: node.mean_value(),
            stats,
        })
    }

    /// Run a single iteration (select -> expand -> simulate -> backpropagate).
    fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let start = Instant::now();
        let selected = self.select();
        let selected_at = Instant::now();

        let leaf = if self.tree.is_fully_expanded(selected) {
            // Only a finished game is fully expanded without children
            selected
        } else {
            self.expand(selected, rng)?
        };
        let expanded_at = Instant::now();

        let (result, moves) = self.simulate(leaf, rng)?;
        let simulated_at = Instant::now();

        self.tree.backpropagate(leaf, result);

        self.stats.iterations += 1;
        self.stats.select_us += micros(start, selected_at);
        self.stats.expand_us += micros(selected_at, expanded_at);
        self.stats.simulate_us += micros(expanded_at, simulated_at);
        self.stats.backprop_us += micros(simulated_at, Instant::now());

        trace!(
            iteration = self.stats.iterations,
            leaf = leaf.0,
            result,
            moves,
            "MCTS iteration complete"
        );

        Ok(())
    }

    /// Descend from the root while nodes are fully expanded, following UCT.
    fn select(&self) -> NodeId {
        let mut current = self.tree.root();

        while self.tree.is_fully_expanded(current) {
            match self.tree.select_child(current, self.config.exploration) {
                Some(child_id) => current = child_id,
                None => break,
            }
        }

        current
    }

    /// Add a child for one random action not yet expanded from `node_id`.
    fn expand(&mut self, node_id: NodeId, rng: &mut ChaCha20Rng) -> Result<NodeId, SearchError> {
        let node = self.tree.get(node_id);
        let unexpanded: Vec<Action> = node
            .legal_actions()
            .into_iter()
            .filter(|action| !node.expanded_actions.contains(action))
            .collect();

        let &action = unexpanded
            .choose(rng)
            .ok_or(SearchError::FullyExpanded(node_id))?;

        let child_player = node.player.opponent();
        let mut board = node.board.clone();
        board.apply(action, child_player)?;

        self.tree.get_mut(node_id).expanded_actions.push(action);
        let child = MctsNode::new_child(node_id, action, board, child_player);
        Ok(self.tree.add_child(node_id, child))
    }

    /// Score a node by random playout, starting with the node's own player.
    fn simulate(
        &mut self,
        node_id: NodeId,
        rng: &mut ChaCha20Rng,
    ) -> Result<(i8, u32), SearchError> {
        let node = self.tree.get(node_id);
        if node.is_terminal {
            self.stats.terminal_hits += 1;
            return Ok((node.terminal_result, 0));
        }

        let result = rollout(&node.board, node.player, self.config.max_depth, rng)?;
        if result.outcome == RolloutOutcome::Truncated {
            self.stats.truncated_rollouts += 1;
        }
        self.stats.rollout_moves += u64::from(result.moves);

        Ok((result.outcome.score(), result.moves))
    }

    /// Root child whose move wins the game on the spot.
    fn forced_win(&self) -> Option<NodeId> {
        let root = self.tree.get(self.tree.root());
        root.children.iter().copied().find(|&id| {
            let child = self.tree.get(id);
            child
                .action
                .is_some_and(|action| child.board.is_win(action, self.agent))
        })
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    /// Consume the search, keeping only the subtree under `child`.
    pub fn into_subtree(self, child: NodeId) -> SavedState {
        self.tree.into_subtree(child)
    }
}

fn micros(from: Instant, to: Instant) -> u64 {
    to.duration_since(from).as_micros() as u64
}

/// Convenience function to run a single MCTS search.
///
/// Returns the result together with the chosen child's subtree.
pub fn run_mcts(
    board: &Board,
    agent: Player,
    saved_state: Option<SavedState>,
    config: MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<(SearchResult, SavedState), SearchError> {
    let mut search = MctsSearch::new(board, agent, saved_state, config)?;
    let result = search.run(rng)?;
    let subtree = search.into_subtree(result.child);
    Ok((result, subtree))
}

/// Pick a move for `player` and return it with the tree to reuse next turn.
pub fn generate_move(
    board: &Board,
    player: Player,
    saved_state: Option<SavedState>,
    config: &MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<(Action, SavedState), SearchError> {
    let (result, subtree) = run_mcts(board, player, saved_state, config.clone(), rng)?;
    Ok((result.action, subtree))
}
