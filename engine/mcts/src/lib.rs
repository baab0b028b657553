//! Monte Carlo Tree Search (MCTS) agent for Connect Four.
//!
//! # Overview
//!
//! MCTS builds a search tree by running iterations from the current board.
//! Each iteration consists of four phases:
//!
//! 1. **Selection**: Traverse the tree using UCT (Upper Confidence bounds
//!    applied to Trees) to balance exploration and exploitation
//! 2. **Expansion**: Add one child for a random action not tried yet
//! 3. **Simulation**: Play uniformly random moves from the new child until
//!    the game ends or the depth limit is hit
//! 4. **Backpropagation**: Update visits, wins and values along the path from
//!    leaf to root, flipping the result at every level
//!
//! # Usage
//!
//! ```rust,no_run
//! use games_connect4::{Board, Player};
//! use mcts::{generate_move, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let config = MctsConfig::default().with_iterations(2000);
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! let board = Board::new();
//! let (action, saved) = generate_move(&board, Player::One, None, &config, &mut rng).unwrap();
//! println!("Best action: {}", action);
//!
//! // After the opponent replies, descend into the saved tree before the next turn
//! let mut board = board;
//! board.apply(action, Player::One).unwrap();
//! board.apply(3, Player::Two).unwrap();
//! let saved = saved.advance(3);
//! let (next, _) = generate_move(&board, Player::One, saved, &config, &mut rng).unwrap();
//! println!("Next action: {}", next);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `iterations`: Visits the root should have when the search returns (default: 1000)
//! - `max_depth`: Rollout length limit, `None` for unbounded (default: `None`)
//! - `exploration`: UCT exploration constant (default: sqrt(2))
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   MctsSearch                    │
//! ├─────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐  │
//! │  │  MctsTree   │  │    Board    │  │ rollout │  │
//! │  │  (arena)    │  │ (game rules)│  │ (random)│  │
//! │  └──────┬──────┘  └──────┬──────┘  └────┬────┘  │
//! │         ▼                ▼              ▼       │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  select → expand → simulate → backprop    │  │
//! │  └───────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod node;
pub mod search;
pub mod simulation;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use node::{MctsNode, NodeId};
pub use search::{
    generate_move, run_mcts, MctsSearch, SavedState, SearchError, SearchResult, SearchStats,
};
pub use simulation::{rollout, Rollout, RolloutOutcome};
pub use tree::{MctsTree, TreeStats};
