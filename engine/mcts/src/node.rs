//! Search tree node representation.
//!
//! Each node owns a full, independent snapshot of the game reached by
//! applying its producing move to the parent's state. Nodes cache the
//! ranked candidate list for their state so expansion order and
//! `is_fully_expanded` never re-run the move generator.

use mosaic_core::{legal_moves, Move, Snapshot};

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
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that produced this node from the parent (None for root)
    pub mv: Option<Move>,

    /// Player to move in this node's state
    pub player: usize,

    /// Game state at this node, fully independent of every other node
    pub snapshot: Snapshot,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Sum of rewards backpropagated through this node, always relative
    /// to the searching player
    pub value_sum: f64,

    /// Whether this state is terminal (every display and the pot drained)
    pub is_terminal: bool,

    /// Ranked candidate moves for `player` in this state. Empty exactly
    /// when terminal.
    pub moves: Vec<Move>,

    /// Children: (producing move, node id) pairs, pairwise-distinct moves.
    pub children: Vec<(Move, NodeId)>,
}

impl Node {
    /// Create a new root node.
    pub fn new_root(snapshot: Snapshot, player: usize) -> Self {
        Self::build(NodeId::NONE, None, snapshot, player)
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, mv: Move, snapshot: Snapshot, player: usize) -> Self {
        Self::build(parent, Some(mv), snapshot, player)
    }

    fn build(parent: NodeId, mv: Option<Move>, snapshot: Snapshot, player: usize) -> Self {
        let is_terminal = snapshot.is_terminal();
        let moves = legal_moves(&snapshot, player);
        debug_assert_eq!(
            moves.is_empty(),
            is_terminal,
            "a state has legal moves exactly while a source is non-empty"
        );

        Self {
            parent,
            mv,
            player,
            snapshot,
            visit_count: 0,
            value_sum: 0.0,
            is_terminal,
            moves,
            children: Vec::new(),
        }
    }

    /// Mean reward, 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visit_count)
        }
    }

    /// UCB1 selection score given the parent's visit count:
    /// `mean + c * sqrt(2 * ln(parent_visits) / visits)`.
    ///
    /// An unvisited child has infinite priority so every child is
    /// sampled once before any is revisited.
    #[inline]
    pub fn ucb_score(&self, parent_visits: u32, c: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visit_count);
        self.mean_value() + c * (2.0 * f64::from(parent_visits.max(1)).ln() / visits).sqrt()
    }

    /// A node is fully expanded once every ranked candidate has a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() == self.moves.len()
    }

    /// First ranked candidate that has no child yet.
    pub fn untried_move(&self) -> Option<Move> {
        self.moves
            .iter()
            .find(|mv| !self.children.iter().any(|(used, _)| used == *mv))
            .copied()
    }
}
