//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
///
/// Passed by value into each search, so one turn's settings never leak
/// into the next.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Total visits the root should have when the search ends.
    /// A reused tree that already has visits runs only the remainder.
    pub iterations: u32,

    /// Maximum number of non-terminal moves in one rollout.
    /// `None` plays every rollout to the end of the game.
    pub max_depth: Option<u32>,

    /// Exploration constant C in the UCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub exploration: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            max_depth: None,
            exploration: std::f64::consts::SQRT_2,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 50,
            ..Self::default()
        }
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: bound rollout length.
    pub fn with_max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder pattern: set the UCT exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }
}
