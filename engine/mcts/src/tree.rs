//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices. Children are owned through the arena;
//! the parent link is a plain index used for backpropagation only.
//!
//! A tree kept between turns is re-rooted with [`MctsTree::into_subtree`],
//! which moves the reachable nodes into a fresh arena and drops the rest.

use std::collections::VecDeque;

use games_connect4::{Action, Board, Player};

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree whose root holds `board` and `player`.
    pub fn new(board: Board, player: Player) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(board, player)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode] {
        &self.nodes
    }

    /// Add `child` under `parent_id` and return the new child's NodeId.
    ///
    /// No duplicate detection: callers track expanded actions themselves.
    pub fn add_child(&mut self, parent_id: NodeId, mut child: MctsNode) -> NodeId {
        child.parent = parent_id;
        let child_id = self.allocate(child);
        self.get_mut(parent_id).children.push(child_id);
        child_id
    }

    /// Check if every action legal on the node's board has been expanded.
    ///
    /// The legal count is recomputed from the board on every call.
    pub fn is_fully_expanded(&self, node_id: NodeId) -> bool {
        let node = self.get(node_id);
        node.is_fully_expanded(node.legal_actions().len())
    }

    /// Find the child reached by `action`, scanning children in order.
    pub fn find_child_by_action(&self, node_id: NodeId, action: Action) -> Option<NodeId> {
        self.get(node_id)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).action == Some(action))
    }

    /// Select the child of a node with the highest UCT score.
    ///
    /// An unvisited child is returned immediately without scoring it. Among
    /// visited children the first one with the strictly highest score wins.
    pub fn select_child(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        // Pre-compute ln once instead of per-child comparison
        let parent_visits_ln = (node.visits.max(1) as f64).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &node.children {
            let child = self.get(child_id);
            if child.visits == 0 {
                return Some(child_id);
            }
            let score = child.uct_score(parent_visits_ln, exploration);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((child_id, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Backpropagate a result from a leaf to the root.
    ///
    /// `result` is from the leaf player's perspective and is negated at each
    /// level, since consecutive levels belong to opposing players.
    pub fn backpropagate(&mut self, leaf_id: NodeId, result: i8) {
        let mut current_id = leaf_id;
        let mut current_result = result;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visits += 1;
            node.value += f32::from(current_result);
            if current_result == 1 {
                node.wins += 1;
            }

            // Negate for opponent's perspective
            current_result = -current_result;

            current_id = node.parent;
        }
    }

    /// Get the most visited child of the root (first found on ties).
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for &child_id in &self.get(self.root).children {
            let visits = self.get(child_id).visits;
            if best.map_or(true, |(_, best_visits)| visits > best_visits) {
                best = Some((child_id, visits));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Turn the subtree under `new_root` into a tree of its own.
    ///
    /// Reachable nodes are moved into a fresh arena in breadth-first order;
    /// the old root and every other branch are dropped.
    pub fn into_subtree(self, new_root: NodeId) -> MctsTree {
        let mut old: Vec<Option<MctsNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes: Vec<MctsNode> = Vec::new();
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let Some(mut node) = old.get_mut(old_id.index()).and_then(Option::take) else {
                continue;
            };
            let new_id = NodeId(nodes.len() as u32);
            node.parent = new_parent;
            for child in std::mem::take(&mut node.children) {
                queue.push_back((child, new_id));
            }
            nodes.push(node);

            if new_parent.is_some() {
                nodes[new_parent.index()].children.push(new_id);
            }
        }

        MctsTree {
            nodes,
            root: NodeId(0),
        }
    }

    /// Descend into the root's child for `action`, keeping only that subtree.
    ///
    /// Returns None when the action was never expanded.
    pub fn advance(self, action: Action) -> Option<MctsTree> {
        let child = self.find_child_by_action(self.root, action)?;
        Some(self.into_subtree(child))
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|id| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expand `action` under `parent` the way the search does.
    fn push_move(tree: &mut MctsTree, parent: NodeId, action: Action) -> NodeId {
        let parent_node = tree.get(parent);
        let player = parent_node.player.opponent();
        let mut board = parent_node.board.clone();
        board.apply(action, player).unwrap();
        tree.get_mut(parent).expanded_actions.push(action);
        tree.add_child(parent, MctsNode::new_child(parent, action, board, player))
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(Board::new(), Player::Two);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.player, Player::Two);
    }

    #[test]
    fn test_add_child() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let child_id = push_move(&mut tree, root, 4);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));

        let root = tree.get(tree.root());
        assert_eq!(root.children, vec![NodeId(1)]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.action, Some(4));
        assert_eq!(child.player, Player::One);
        assert_eq!(child.board.cell(0, 4), Some(Player::One));
    }

    #[test]
    fn test_find_child_by_action() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let c2 = push_move(&mut tree, root, 2);
        let c5 = push_move(&mut tree, root, 5);

        assert_eq!(tree.find_child_by_action(tree.root(), 2), Some(c2));
        assert_eq!(tree.find_child_by_action(tree.root(), 5), Some(c5));
        assert_eq!(tree.find_child_by_action(tree.root(), 0), None);
    }

    #[test]
    fn test_is_fully_expanded_uses_live_board() {
        // Six columns are full, only column 6 is playable
        let board = Board::from_moves(&[
            0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 2, 3, 2, 3, 3, 2, 3, 2, 2, 3, 2, 3, 4, 5, 4, 5,
            5, 4, 5, 4, 4, 5, 4, 5,
        ])
        .unwrap();
        assert_eq!(board.legal_actions(), vec![6]);

        let mut tree = MctsTree::new(board, Player::Two);
        let root = tree.root();
        assert!(!tree.is_fully_expanded(tree.root()));

        push_move(&mut tree, root, 6);
        assert!(tree.is_fully_expanded(tree.root()));
    }

    #[test]
    fn test_backpropagate_flips_perspective() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();

        // Create a chain: root -> child -> grandchild
        let child_id = push_move(&mut tree, root, 0);
        let grandchild_id = push_move(&mut tree, child_id, 1);

        tree.backpropagate(grandchild_id, 1);

        // Check visits
        assert_eq!(tree.get(grandchild_id).visits, 1);
        assert_eq!(tree.get(child_id).visits, 1);
        assert_eq!(tree.get(tree.root()).visits, 1);

        // Check values (negated at each level)
        assert!((tree.get(grandchild_id).value - 1.0).abs() < 1e-6);
        assert!((tree.get(child_id).value - (-1.0)).abs() < 1e-6);
        assert!((tree.get(tree.root()).value - 1.0).abs() < 1e-6);

        // Wins only where the flipped result is +1
        assert_eq!(tree.get(grandchild_id).wins, 1);
        assert_eq!(tree.get(child_id).wins, 0);
        assert_eq!(tree.get(tree.root()).wins, 1);
    }

    #[test]
    fn test_backpropagate_draw_counts_no_wins() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let child_id = push_move(&mut tree, root, 3);

        tree.backpropagate(child_id, 0);

        for id in [child_id, tree.root()] {
            let node = tree.get(id);
            assert_eq!(node.visits, 1);
            assert_eq!(node.wins, 0);
            assert!(node.value.abs() < 1e-6);
        }
    }

    #[test]
    fn test_select_child_prefers_unvisited() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let visited = push_move(&mut tree, root, 0);
        let unvisited = push_move(&mut tree, root, 1);

        // Perfect record on the visited child must not matter
        for _ in 0..50 {
            tree.backpropagate(visited, 1);
        }

        assert_eq!(tree.select_child(tree.root(), 1.4), Some(unvisited));
    }

    #[test]
    fn test_select_child_uct() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let weak = push_move(&mut tree, root, 0);
        let strong = push_move(&mut tree, root, 1);

        for _ in 0..10 {
            tree.backpropagate(weak, -1);
            tree.backpropagate(strong, 1);
        }
        assert_eq!(tree.select_child(tree.root(), 1.4), Some(strong));

        // Equal statistics: first child wins the tie
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let first = push_move(&mut tree, root, 2);
        let second = push_move(&mut tree, root, 3);
        tree.backpropagate(first, 1);
        tree.backpropagate(second, 1);
        assert_eq!(tree.select_child(tree.root(), 1.4), Some(first));
    }

    #[test]
    fn test_best_child_by_visits() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        assert_eq!(tree.best_child(), None);

        let c1 = push_move(&mut tree, root, 0);
        let c2 = push_move(&mut tree, root, 1);
        let c3 = push_move(&mut tree, root, 2);

        tree.get_mut(c1).visits = 30;
        tree.get_mut(c2).visits = 70;
        tree.get_mut(c3).visits = 70;

        // Ties resolve to the first child found
        assert_eq!(tree.best_child(), Some(c2));
    }

    #[test]
    fn test_into_subtree() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let keep = push_move(&mut tree, root, 3);
        let other = push_move(&mut tree, root, 4);
        let g1 = push_move(&mut tree, keep, 3);
        let g2 = push_move(&mut tree, keep, 2);
        push_move(&mut tree, other, 4);
        let gg = push_move(&mut tree, g2, 2);
        tree.backpropagate(gg, 1);
        tree.backpropagate(g1, -1);

        let keep_board = tree.get(keep).board.clone();
        let keep_visits = tree.get(keep).visits;

        let sub = tree.into_subtree(keep);

        // keep, g1, g2, gg
        assert_eq!(sub.len(), 4);
        let root = sub.get(sub.root());
        assert!(root.parent.is_none());
        assert_eq!(root.board, keep_board);
        assert_eq!(root.visits, keep_visits);
        assert_eq!(root.player, Player::One);
        assert_eq!(root.children.len(), 2);

        // Child order and parent links survive the move
        let first = sub.get(root.children[0]);
        let second = sub.get(root.children[1]);
        assert_eq!(first.action, Some(3));
        assert_eq!(second.action, Some(2));
        assert_eq!(first.parent, sub.root());
        assert_eq!(second.children.len(), 1);
        let great = sub.get(second.children[0]);
        assert_eq!(great.parent, root.children[1]);
        assert_eq!(great.visits, 1);

        // Backpropagation in the new tree stops at the new root
        let mut sub = sub;
        let leaf = sub.get(sub.root()).children[0];
        sub.backpropagate(leaf, 1);
        assert_eq!(sub.get(sub.root()).visits, keep_visits + 1);
    }

    #[test]
    fn test_advance() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let c = push_move(&mut tree, root, 5);
        push_move(&mut tree, c, 1);

        let missing = tree.clone().advance(0);
        assert!(missing.is_none());

        let next = tree.advance(5).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next.get(next.root()).action, Some(5));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MctsTree::new(Board::new(), Player::Two);
        let root = tree.root();
        let c = push_move(&mut tree, root, 0);
        push_move(&mut tree, c, 0);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.max_depth, 2);
    }
}
