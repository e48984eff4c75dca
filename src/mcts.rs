//! Monte Carlo Tree Search (MCTS) with UCT selection.
//!
//! Each search builds a fresh tree rooted at the engine's board and runs a
//! fixed number of iterations of four phases:
//! - Selection: descend by UCT until a node without children
//! - Expansion: attach one random unexplored move as a new child
//! - Simulation: random playout from the new child (see [`crate::playout`])
//! - Backpropagation: add the playout value to every node up to the root
//!
//! Nodes live in an arena and refer to each other by index. Every node owns
//! its own copy of the board, so playouts never disturb the tree.

use std::time::Instant;

use crate::board::{Board, Player};
use crate::constants::REPORT_PERIOD;
use crate::difficulty::{Difficulty, SearchSettings};
use crate::moves::{Move, MoveError};
use crate::playout::rollout;

/// Index of a node in a [`SearchTree`].
pub type NodeId = usize;

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// The move leading here from the parent; `None` for the root.
    pub mv: Option<Move>,
    /// Parent node; `None` for the root.
    pub parent: Option<NodeId>,
    /// Children in creation order.
    pub children: Vec<NodeId>,
    /// Board after `mv` was played.
    pub board: Board,
    /// Number of playouts that passed through this node.
    pub visits: u32,
    /// Sum of playout values that passed through this node.
    pub reward: f64,
}

impl SearchNode {
    fn new(mv: Option<Move>, parent: Option<NodeId>, board: Board) -> Self {
        Self {
            mv,
            parent,
            children: Vec::new(),
            board,
            visits: 0,
            reward: 0.0,
        }
    }

    /// Average playout value, or `None` before the first visit.
    #[inline]
    pub fn mean(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.reward / f64::from(self.visits))
    }

    /// True when no child has been attached yet.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-allocated search tree. The root is always [`SearchTree::ROOT`].
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    exploration: f64,
}

impl SearchTree {
    /// Id of the root node.
    pub const ROOT: NodeId = 0;

    /// Create a tree holding only a root for `board`.
    pub fn new(board: Board, exploration: f64) -> Self {
        Self {
            nodes: vec![SearchNode::new(None, None, board)],
            exploration,
        }
    }

    /// The node with id `id`.
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    /// The root node.
    pub fn root(&self) -> &SearchNode {
        &self.nodes[Self::ROOT]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exploration constant used by [`SearchTree::uct`].
    pub const fn exploration(&self) -> f64 {
        self.exploration
    }

    /// Attach a child of `id` for `mv`, played on a copy of `id`'s board.
    pub fn expand_with(&mut self, id: NodeId, mv: Move) -> Result<NodeId, MoveError> {
        let mut board = self.nodes[id].board.clone();
        board.apply_move(&mv)?;

        let child = self.nodes.len();
        self.nodes.push(SearchNode::new(Some(mv), Some(id), board));
        self.nodes[id].children.push(child);
        Ok(child)
    }

    /// Legal moves at `id` that no child represents yet, in generation order.
    pub fn unexplored_moves(&self, id: NodeId) -> Vec<Move> {
        let node = &self.nodes[id];
        let mut moves = node.board.legal_moves(node.board.current_player());
        moves.retain(|m| {
            !node
                .children
                .iter()
                .any(|&c| self.nodes[c].mv.as_ref() == Some(m))
        });
        moves
    }

    /// UCT score of `id` relative to its parent.
    ///
    /// Unvisited nodes and the root score `f64::INFINITY`.
    pub fn uct(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        let Some(parent) = node.parent else {
            return f64::INFINITY;
        };
        if node.visits == 0 {
            return f64::INFINITY;
        }

        let visits = f64::from(node.visits);
        let parent_visits = f64::from(self.nodes[parent].visits);
        let exploitation = node.reward / visits;
        let exploration = self.exploration * (parent_visits.ln() / visits).sqrt();
        exploitation + exploration
    }

    /// Child of `id` with the highest UCT score, first one on ties.
    pub fn best_child_by_uct(&self, id: NodeId) -> Option<NodeId> {
        first_max_by(&self.nodes[id].children, |c| self.uct(c))
    }

    /// Child of `id` with the most visits, first one on ties.
    pub fn best_child_by_visits(&self, id: NodeId) -> Option<NodeId> {
        first_max_by(&self.nodes[id].children, |c| f64::from(self.nodes[c].visits))
    }

    /// Add `result` to `id` and every ancestor up to and including the root.
    pub fn backpropagate(&mut self, id: NodeId, result: f64) {
        let mut current = Some(id);
        while let Some(i) = current {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.reward += result;
            current = node.parent;
        }
    }

    /// Descend from the root by UCT until reaching a node with no children.
    pub fn select(&self) -> NodeId {
        let mut id = Self::ROOT;
        while let Some(child) = self.best_child_by_uct(id) {
            id = child;
        }
        id
    }

    /// Log the root's children at debug level.
    pub fn dump_children(&self) {
        for &c in &self.root().children {
            let child = &self.nodes[c];
            log::debug!(
                "move {} v={} r={:.1} mean={:.3}",
                child.mv.as_ref().map_or_else(String::new, Move::to_string),
                child.visits,
                child.reward,
                child.mean().unwrap_or(0.0)
            );
        }
    }
}

/// The first element maximizing `key`. Later elements must be strictly
/// greater to replace it.
fn first_max_by(ids: &[NodeId], key: impl Fn(NodeId) -> f64) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for &id in ids {
        let value = key(id);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((id, value)),
        }
    }
    best.map(|(id, _)| id)
}

/// Move-choosing engine driven by MCTS.
pub struct MctsEngine {
    board: Board,
    settings: SearchSettings,
    rng: fastrand::Rng,
}

impl MctsEngine {
    /// Create an engine for `board` with a randomly seeded generator.
    pub fn new(board: Board, difficulty: Difficulty) -> Self {
        Self::with_rng(board, difficulty.settings(), fastrand::Rng::new())
    }

    /// Create an engine whose searches are reproducible for a given seed.
    pub fn with_seed(board: Board, difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(board, difficulty.settings(), fastrand::Rng::with_seed(seed))
    }

    /// Create an engine with explicit settings and generator.
    pub fn with_rng(board: Board, settings: SearchSettings, rng: fastrand::Rng) -> Self {
        Self {
            board,
            settings,
            rng,
        }
    }

    /// The position searched by [`MctsEngine::search`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the position to search.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Current search settings.
    pub const fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// Replace the search settings.
    pub fn set_settings(&mut self, settings: SearchSettings) {
        self.settings = settings;
    }

    /// Switch to the settings of a difficulty preset.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings = difficulty.settings();
    }

    /// Reseed the random generator.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    /// Choose a move for the side to move on the engine's board.
    ///
    /// `legal_moves` should be that side's legal moves. When the search never
    /// expands the root, the first supplied move is returned; `None` only if
    /// the list is empty as well.
    pub fn choose_move(&mut self, legal_moves: &[Move]) -> Option<Move> {
        let tree = self.search();
        match tree.best_child_by_visits(SearchTree::ROOT) {
            Some(best) => tree.node(best).mv.clone(),
            None => {
                log::warn!("search tree never grew past the root, playing the first legal move");
                legal_moves.first().cloned()
            }
        }
    }

    /// Run one full search and return the resulting tree.
    pub fn search(&mut self) -> SearchTree {
        let started = Instant::now();
        let perspective = self.board.current_player();
        let mut tree = SearchTree::new(self.board.clone(), self.settings.exploration);

        for i in 0..self.settings.iterations {
            if let Some(limit) = self.settings.time_limit
                && i > 0
                && started.elapsed() >= limit
            {
                log::debug!("time limit reached after {i} iterations");
                break;
            }

            let leaf = tree.select();
            let node = self.expand(&mut tree, leaf);
            let result = rollout(&tree.node(node).board, perspective, &mut self.rng);
            tree.backpropagate(node, result);

            if (i + 1) % REPORT_PERIOD == 0 {
                report(&tree, i + 1, perspective);
            }
        }

        tree.dump_children();
        tree
    }

    /// Expand `leaf` with one random unexplored move, returning the node to
    /// simulate from.
    fn expand(&mut self, tree: &mut SearchTree, leaf: NodeId) -> NodeId {
        let mut unexplored = tree.unexplored_moves(leaf);
        if unexplored.is_empty() {
            return leaf;
        }
        let mv = unexplored.swap_remove(self.rng.usize(..unexplored.len()));
        log::trace!("expanding node {leaf} with {mv}");
        match tree.expand_with(leaf, mv) {
            Ok(child) => child,
            Err(err) => {
                log::warn!("expansion of node {leaf} failed: {err}");
                leaf
            }
        }
    }
}

fn report(tree: &SearchTree, iterations: usize, perspective: Player) {
    let best = tree
        .best_child_by_visits(SearchTree::ROOT)
        .map(|id| tree.node(id));
    log::debug!(
        "{iterations} iterations for {perspective}: {} nodes, best {} ({} visits, mean {:.3})",
        tree.len(),
        best.and_then(|n| n.mv.as_ref())
            .map_or_else(|| "-".to_string(), Move::to_string),
        best.map_or(0, |n| n.visits),
        best.and_then(SearchNode::mean).unwrap_or(0.0)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::constants::{DRAW, LOSS, WIN};
    use pretty_assertions::assert_eq;

    /// Root with two children created from the first two opening moves.
    fn two_child_tree() -> (SearchTree, NodeId, NodeId) {
        let board = Board::new();
        let moves = board.legal_moves(Player::Red);
        let mut tree = SearchTree::new(board, std::f64::consts::SQRT_2);
        let a = tree.expand_with(SearchTree::ROOT, moves[0].clone()).unwrap();
        let b = tree.expand_with(SearchTree::ROOT, moves[1].clone()).unwrap();
        (tree, a, b)
    }

    #[test]
    fn test_expand_with_applies_move_on_copy() {
        let board = Board::new();
        let mv = board.legal_moves(Player::Red)[0].clone();
        let mut tree = SearchTree::new(board.clone(), 1.0);
        let child = tree.expand_with(SearchTree::ROOT, mv.clone()).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().children, vec![child]);
        assert_eq!(tree.node(child).parent, Some(SearchTree::ROOT));
        assert_eq!(tree.node(child).mv, Some(mv.clone()));
        assert_eq!(tree.root().board, board);

        let mut expected = board;
        expected.apply_move(&mv).unwrap();
        assert_eq!(tree.node(child).board, expected);
        assert_eq!(tree.node(child).board.current_player(), Player::Black);
    }

    #[test]
    fn test_expand_with_rejects_bad_move() {
        let mut tree = SearchTree::new(Board::new(), 1.0);
        let bad = Move::step((4, 1), (3, 2)).unwrap();
        assert!(tree.expand_with(SearchTree::ROOT, bad).is_err());
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn test_unexplored_moves() {
        let (tree, a, b) = two_child_tree();
        let all = Board::new().legal_moves(Player::Red);
        let unexplored = tree.unexplored_moves(SearchTree::ROOT);
        assert_eq!(unexplored, all[2..].to_vec());
        assert!(!unexplored.contains(tree.node(a).mv.as_ref().unwrap()));
        assert!(!unexplored.contains(tree.node(b).mv.as_ref().unwrap()));
    }

    #[test]
    fn test_unexplored_moves_on_stuck_board_is_empty() {
        let mut board = Board::empty(Player::Red);
        board.set((3, 4), Some(Piece::Man(Player::Black))).unwrap();
        let tree = SearchTree::new(board, 1.0);
        assert!(tree.unexplored_moves(SearchTree::ROOT).is_empty());
    }

    #[test]
    fn test_uct_unvisited_and_root_are_infinite() {
        let (mut tree, a, b) = two_child_tree();
        assert_eq!(tree.uct(SearchTree::ROOT), f64::INFINITY);
        tree.backpropagate(a, WIN);
        assert!(tree.uct(a).is_finite());
        assert_eq!(tree.uct(b), f64::INFINITY);
        assert_eq!(tree.best_child_by_uct(SearchTree::ROOT), Some(b));
    }

    #[test]
    fn test_uct_prefers_higher_mean_at_equal_visits() {
        let (mut tree, a, b) = two_child_tree();
        for _ in 0..4 {
            tree.backpropagate(a, WIN);
            tree.backpropagate(b, DRAW);
        }
        assert!(tree.uct(a) > tree.uct(b));
        assert_eq!(tree.best_child_by_uct(SearchTree::ROOT), Some(a));
    }

    #[test]
    fn test_uct_prefers_fewer_visits_at_equal_mean() {
        let (mut tree, a, b) = two_child_tree();
        for _ in 0..2 {
            tree.backpropagate(a, WIN);
        }
        for _ in 0..6 {
            tree.backpropagate(b, WIN);
        }
        assert!(tree.uct(a) > tree.uct(b));
    }

    #[test]
    fn test_uct_formula() {
        let (mut tree, a, b) = two_child_tree();
        tree.backpropagate(a, WIN);
        tree.backpropagate(a, LOSS);
        tree.backpropagate(b, WIN);
        // root visits = 3, a: 2 visits, reward 1.0
        let expected = 0.5 + std::f64::consts::SQRT_2 * (3f64.ln() / 2.0).sqrt();
        assert!((tree.uct(a) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_backpropagate_conservation() {
        let (mut tree, a, b) = two_child_tree();
        let mv = tree.unexplored_moves(a)[0].clone();
        let grandchild = tree.expand_with(a, mv).unwrap();

        let results = [WIN, LOSS, DRAW, WIN];
        for r in results {
            tree.backpropagate(grandchild, r);
        }
        tree.backpropagate(b, DRAW);

        assert_eq!(tree.node(grandchild).visits, 4);
        assert_eq!(tree.node(grandchild).reward, 2.5);
        assert_eq!(tree.node(a).visits, 4);
        assert_eq!(tree.node(a).reward, 2.5);
        assert_eq!(tree.node(b).visits, 1);
        assert_eq!(tree.node(b).reward, 0.5);
        assert_eq!(tree.root().visits, 5);
        assert_eq!(tree.root().reward, 3.0);
    }

    #[test]
    fn test_best_child_by_visits_ties_go_to_first() {
        let (mut tree, a, b) = two_child_tree();
        assert_eq!(tree.best_child_by_visits(SearchTree::ROOT), Some(a));
        tree.backpropagate(b, WIN);
        assert_eq!(tree.best_child_by_visits(SearchTree::ROOT), Some(b));
        tree.backpropagate(a, LOSS);
        assert_eq!(tree.best_child_by_visits(SearchTree::ROOT), Some(a));
        assert_eq!(tree.best_child_by_visits(a), None);
    }

    #[test]
    fn test_select_stops_at_frontier() {
        let (mut tree, a, b) = two_child_tree();
        assert_eq!(tree.select(), a);
        tree.backpropagate(a, WIN);
        assert_eq!(tree.select(), b);
    }

    #[test]
    fn test_search_visits_sum_to_iterations() {
        let settings = SearchSettings::new(60, std::f64::consts::SQRT_2);
        let mut engine = MctsEngine::with_rng(Board::new(), settings, fastrand::Rng::with_seed(5));
        let tree = engine.search();

        assert_eq!(tree.root().visits, 60);
        assert_eq!(tree.exploration(), std::f64::consts::SQRT_2);
        let child_visits: u32 = tree.root().children.iter().map(|&c| tree.node(c).visits).sum();
        assert_eq!(child_visits, 60);
        // Selection always descends past a root that has any child, so the
        // root is expanded exactly once.
        assert_eq!(tree.root().children.len(), 1);
    }

    #[test]
    fn test_choose_move_is_legal_and_seeded() {
        let mut board = Board::new();
        let opening = board.legal_moves(Player::Red)[2].clone();
        board.apply_move(&opening).unwrap();
        let legal = board.legal_moves(Player::Black);

        let mut first = MctsEngine::with_seed(board.clone(), Difficulty::Easy, 99);
        let mut second = MctsEngine::with_seed(board, Difficulty::Easy, 99);
        let a = first.choose_move(&legal).unwrap();
        let b = second.choose_move(&legal).unwrap();
        assert!(legal.contains(&a));
        assert_eq!(a, b);
    }

    #[test]
    fn test_choose_move_single_forced_capture() {
        let mut board = Board::empty(Player::Black);
        board.set((2, 3), Some(Piece::Man(Player::Black))).unwrap();
        board.set((3, 4), Some(Piece::Man(Player::Red))).unwrap();
        board.set((6, 1), Some(Piece::Man(Player::Red))).unwrap();
        let legal = board.legal_moves(Player::Black);
        assert_eq!(legal.len(), 1);

        let mut engine = MctsEngine::with_seed(board, Difficulty::Easy, 1);
        assert_eq!(engine.choose_move(&legal), Some(legal[0].clone()));
    }

    #[test]
    fn test_choose_move_falls_back_to_first_supplied() {
        let mut board = Board::empty(Player::Red);
        board.set((3, 4), Some(Piece::Man(Player::Black))).unwrap();
        let supplied = vec![Move::step((5, 0), (4, 1)).unwrap()];

        let mut engine = MctsEngine::with_seed(board, Difficulty::Easy, 1);
        assert_eq!(engine.choose_move(&supplied), Some(supplied[0].clone()));
        assert_eq!(engine.choose_move(&[]), None);
    }

    #[test]
    fn test_time_limit_still_runs_one_iteration() {
        let settings =
            SearchSettings::new(1_000_000, 1.0).with_time_limit(std::time::Duration::ZERO);
        let mut engine = MctsEngine::with_rng(Board::new(), settings, fastrand::Rng::with_seed(2));
        let tree = engine.search();
        assert_eq!(tree.root().visits, 1);
        assert!(tree.best_child_by_visits(SearchTree::ROOT).is_some());
    }

    #[test]
    fn test_difficulty_can_be_changed() {
        let mut engine = MctsEngine::with_seed(Board::new(), Difficulty::Easy, 0);
        assert_eq!(engine.settings(), Difficulty::Easy.settings());
        engine.set_difficulty(Difficulty::Hard);
        assert_eq!(engine.settings().iterations, Difficulty::Hard.settings().iterations);
    }
}
