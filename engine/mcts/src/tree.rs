//! Search tree with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by `NodeId`
//! indices, so branching never deep-copies subtrees and parent links are
//! plain indices. The whole arena is dropped when a decision commits or
//! the search is cancelled; trees never survive across turns.

use mosaic_core::{Move, Snapshot};
use crate::node::{Node, NodeId};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree {
    /// Arena storing all nodes
    nodes: Vec<Node>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl SearchTree {
    /// Create a new tree rooted at `snapshot` with `player` to move.
    pub fn new(snapshot: Snapshot, player: usize) -> Self {
        let root_node = Node::new_root(snapshot, player);
        Self {
            nodes: vec![root_node],
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
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child under `parent_id` for `mv`, holding `snapshot` with
    /// `player` to move. Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        mv: Move,
        snapshot: Snapshot,
        player: usize,
    ) -> NodeId {
        debug_assert!(
            !self
                .get(parent_id)
                .children
                .iter()
                .any(|(used, _)| *used == mv),
            "children must carry pairwise-distinct producing moves"
        );

        let child = Node::new_child(parent_id, mv, snapshot, player);
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(child);
        self.get_mut(parent_id).children.push((mv, child_id));
        child_id
    }

    /// Select the highest-scoring child of a node by UCB1.
    pub fn select_child(&self, node_id: NodeId, c: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;

        node.children
            .iter()
            .max_by(|(_, id_a), (_, id_b)| {
                let score_a = self.get(*id_a).ucb_score(parent_visits, c);
                let score_b = self.get(*id_b).ucb_score(parent_visits, c);
                score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, id)| *id)
    }

    /// Backpropagate a reward from a node to the root, incrementing
    /// visits along the way.
    ///
    /// The reward is always relative to the fixed searching player, so it
    /// is added unchanged at every ancestor; there is no sign alternation
    /// in this multi-player game.
    pub fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut current_id = from;
        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += reward;
            current_id = node.parent;
        }
    }

    /// The robust child decision: the root's most-visited child's move.
    /// Returns None while the root has no children.
    pub fn best_move(&self) -> Option<Move> {
        let root = self.get(self.root);
        root.children
            .iter()
            .max_by_key(|(_, id)| self.get(*id).visit_count)
            .map(|(mv, _)| *mv)
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
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
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{apply_move, Color, PlayerBoard, Pot, TileCounts};

    fn snapshot() -> Snapshot {
        let display: TileCounts = [Color::Red, Color::Red, Color::Blue].into_iter().collect();
        Snapshot::new(
            vec![PlayerBoard::new(), PlayerBoard::new()],
            vec![display],
            Pot::default(),
        )
        .unwrap()
    }

    /// Expand the next untried candidate under `parent` by actually
    /// applying it, mirroring what the engine does.
    fn expand_one(tree: &mut SearchTree, parent: NodeId) -> NodeId {
        let node = tree.get(parent);
        let mv = node.untried_move().expect("parent has untried moves");
        let next = apply_move(&node.snapshot, node.player, mv);
        let player = next.next_player(node.player);
        tree.add_child(parent, mv, next, player)
    }

    #[test]
    fn test_new_tree() {
        let tree = SearchTree::new(snapshot(), 0);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(!tree.is_empty());

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.player, 0);
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = SearchTree::new(snapshot(), 0);
        let root = tree.root();
        let child_id = expand_one(&mut tree, root);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));

        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].1, child_id);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.player, 1);
        assert_eq!(Some(root.children[0].0), child.mv);
    }

    #[test]
    fn test_backpropagate_adds_reward_unchanged() {
        let mut tree = SearchTree::new(snapshot(), 0);
        let root = tree.root();
        let child_id = expand_one(&mut tree, root);
        let grandchild_id = expand_one(&mut tree, child_id);

        tree.backpropagate(grandchild_id, 2.5);

        for id in [grandchild_id, child_id, tree.root()] {
            assert_eq!(tree.get(id).visit_count, 1);
            assert!((tree.get(id).value_sum - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_select_child_prefers_unvisited_then_value() {
        let mut tree = SearchTree::new(snapshot(), 0);
        let root = tree.root();
        let a = expand_one(&mut tree, root);
        let b = expand_one(&mut tree, root);

        tree.backpropagate(a, 1.0);
        // b is unvisited: infinite priority.
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(b));

        tree.backpropagate(b, 5.0);
        // Both visited once; b carries the higher mean.
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(b));
    }

    #[test]
    fn test_best_move_is_most_visited_not_best_valued() {
        let mut tree = SearchTree::new(snapshot(), 0);
        let root = tree.root();
        let a = expand_one(&mut tree, root);
        let b = expand_one(&mut tree, root);

        // a: 3 visits of modest reward; b: 1 visit of high reward.
        tree.backpropagate(a, 1.0);
        tree.backpropagate(a, 1.0);
        tree.backpropagate(a, 1.0);
        tree.backpropagate(b, 10.0);

        let best = tree.best_move().unwrap();
        assert_eq!(best, tree.get(a).mv.unwrap());
    }

    #[test]
    fn test_best_move_none_without_children() {
        let tree = SearchTree::new(snapshot(), 0);
        assert!(tree.best_move().is_none());
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = SearchTree::new(snapshot(), 0);
        let root = tree.root();
        let child = expand_one(&mut tree, root);
        expand_one(&mut tree, child);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.max_depth, 2);
    }
}
