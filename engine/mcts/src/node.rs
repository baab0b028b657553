//! MCTS tree node representation.
//!
//! Each node represents a board reached by taking an action from the parent.
//! Nodes store the visit statistics used for UCT selection and final move choice.

use games_connect4::{Action, Board, Player};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root). Only used to walk back up during
    /// backpropagation, never to keep the parent alive.
    pub parent: NodeId,

    /// Action that led to this node from parent (None for root)
    pub action: Option<Action>,

    /// Board at this node
    pub board: Board,

    /// Player whose piece produced this board. The root holds the opponent of
    /// the searching agent, so the root's children are the agent's moves.
    pub player: Player,

    /// Sum of results backpropagated through this node, from `player`'s perspective
    pub value: f32,

    /// Number of backpropagated results that were a strict win for `player`
    pub wins: u32,

    /// Number of times this node has been visited
    pub visits: u32,

    /// Actions already expanded from this node, in expansion order
    pub expanded_actions: Vec<Action>,

    /// Child node ids, in expansion order
    pub children: Vec<NodeId>,

    /// Whether the move into this node ended the game
    pub is_terminal: bool,

    /// Result of the finished game for `player` (1 = win, 0 = draw).
    /// Only valid if is_terminal.
    pub terminal_result: i8,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(board: Board, player: Player) -> Self {
        Self {
            parent: NodeId::NONE,
            action: None,
            board,
            player,
            value: 0.0,
            wins: 0,
            visits: 0,
            expanded_actions: Vec::new(),
            children: Vec::new(),
            is_terminal: false,
            terminal_result: 0,
        }
    }

    /// Create a new child node for `player` having played `action` into `board`.
    ///
    /// Terminal status is derived from the board.
    pub fn new_child(parent: NodeId, action: Action, board: Board, player: Player) -> Self {
        let won = board.is_win(action, player);
        let is_terminal = won || board.is_full();
        Self {
            parent,
            action: Some(action),
            board,
            player,
            value: 0.0,
            wins: 0,
            visits: 0,
            expanded_actions: Vec::new(),
            children: Vec::new(),
            is_terminal,
            terminal_result: i8::from(won),
        }
    }

    /// Calculate mean value = value / visits.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f32
        }
    }

    /// Fraction of visits that ended in a win for this node's player.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins as f64 / self.visits as f64
        }
    }

    /// UCT score for selecting this node under a parent.
    /// UCT = wins / visits + c * sqrt(ln(N_parent) / visits)
    ///
    /// Takes pre-computed ln(parent_visits) so siblings share one log call.
    /// Undefined for unvisited nodes, callers must pick those first.
    #[inline]
    pub fn uct_score(&self, parent_visits_ln: f64, exploration: f64) -> f64 {
        let visits = self.visits as f64;
        self.win_rate() + exploration * (parent_visits_ln / visits).sqrt()
    }

    /// Legal actions as seen by the search. Terminal nodes have none.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal {
            Vec::new()
        } else {
            self.board.legal_actions()
        }
    }

    /// Check if every legal action has been expanded into a child.
    #[inline]
    pub fn is_fully_expanded(&self, legal_action_count: usize) -> bool {
        self.expanded_actions.len() >= legal_action_count
    }
}
