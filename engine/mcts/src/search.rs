//! The search engine: select, expand, simulate, backpropagate.
//!
//! One engine instance serves exactly one turn decision. The tree is
//! rooted at a snapshot taken when the computer player's turn began and
//! is dropped as soon as a move commits or the search is cancelled.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::trace;

use mosaic_core::{apply_move, evaluate, legal_moves, Move, Snapshot};

use crate::config::Difficulty;
use crate::node::NodeId;
use crate::tree::SearchTree;

/// Opponents scoring above this fraction of the searcher's reward count
/// as threats for the competitive adjustment.
const THREAT_RATIO: f64 = 0.9;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A non-terminal state produced no candidate moves. The rules make
    /// this impossible (the floor line is always a legal destination), so
    /// it signals a corrupted snapshot rather than a recoverable
    /// condition.
    #[error("no legal moves in a non-terminal state")]
    NoLegalMoves,
}

/// Monte Carlo tree search for a single turn decision.
pub struct Mcts {
    tree: SearchTree,
    /// The player this search decides for; rewards are relative to them.
    searcher: usize,
    difficulty: Difficulty,
    exploration: f64,
}

impl Mcts {
    /// Root a new search at `snapshot` with `player` to move (also the
    /// player being decided for).
    pub fn new(snapshot: Snapshot, player: usize, difficulty: Difficulty, exploration: f64) -> Self {
        Self {
            tree: SearchTree::new(snapshot, player),
            searcher: player,
            difficulty,
            exploration,
        }
    }

    /// Run a single iteration (select, expand, simulate, backpropagate).
    pub fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let selected = self.select();

        let node = self.tree.get(selected);
        let target = if !node.is_terminal && !node.is_fully_expanded() {
            self.expand(selected)?
        } else {
            selected
        };

        let reward = self.simulate(target, rng);
        self.tree.backpropagate(target, reward);

        trace!(
            node = target.0,
            reward,
            nodes = self.tree.len(),
            "search iteration complete"
        );
        Ok(())
    }

    /// The robust-child decision: the root's most-visited child's move.
    pub fn best_move(&self) -> Option<Move> {
        self.tree.best_move()
    }

    /// Whether the root state is terminal (nothing left to decide).
    pub fn root_is_terminal(&self) -> bool {
        self.tree.get(self.tree.root()).is_terminal
    }

    /// The ranked candidate moves at the root.
    pub fn root_moves(&self) -> &[Move] {
        &self.tree.get(self.tree.root()).moves
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Descend from the root while nodes are fully expanded, stopping at
    /// the first terminal or expandable node.
    fn select(&self) -> NodeId {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if node.is_terminal || !node.is_fully_expanded() {
                break;
            }
            match self.tree.select_child(current, self.exploration) {
                Some(child_id) => current = child_id,
                None => break, // fully expanded with no children: terminal
            }
        }

        current
    }

    /// Expand `node_id` with the first candidate move, in ranked order,
    /// that no existing child carries. Deterministic on purpose so a
    /// seeded search is reproducible.
    fn expand(&mut self, node_id: NodeId) -> Result<NodeId, SearchError> {
        let node = self.tree.get(node_id);
        let mv = node.untried_move().ok_or(SearchError::NoLegalMoves)?;

        let snapshot = apply_move(&node.snapshot, node.player, mv);
        let player = snapshot.next_player(node.player);
        Ok(self.tree.add_child(node_id, mv, snapshot, player))
    }

    /// Roll the state out to terminal with the difficulty's policy and
    /// reduce the per-player rewards to one scalar for the searcher.
    ///
    /// Hard uses "certain + potential": the evaluation of the state as it
    /// stands plus the evaluation of the greedily-played-out terminal.
    /// Easy scores the present state only.
    fn simulate(&self, node_id: NodeId, rng: &mut ChaCha20Rng) -> f64 {
        let node = self.tree.get(node_id);
        let certain = evaluate(&node.snapshot);

        let mut snapshot = node.snapshot.clone();
        let mut player = node.player;
        while !snapshot.is_terminal() {
            let moves = legal_moves(&snapshot, player);
            debug_assert!(
                !moves.is_empty(),
                "non-terminal rollout state must have moves"
            );
            if moves.is_empty() {
                break;
            }
            let mv = match self.difficulty {
                Difficulty::Hard => moves[0],
                Difficulty::Easy => moves[rng.gen_range(0..moves.len())],
            };
            snapshot = apply_move(&snapshot, player, mv);
            player = snapshot.next_player(player);
        }

        let rewards: Vec<f64> = match self.difficulty {
            Difficulty::Easy => certain,
            Difficulty::Hard => {
                let potential = evaluate(&snapshot);
                certain
                    .iter()
                    .zip(potential)
                    .map(|(c, p)| c + p)
                    .collect()
            }
        };

        competitive_reward(&rewards, self.searcher)
    }
}

/// Reduce per-player rewards to a single scalar for `searcher`.
///
/// Opponents close behind (or ahead) are what actually matters, so the
/// searcher's reward is measured against the mean of opponents above
/// [`THREAT_RATIO`] of its own; with no close opponent, against the mean
/// of the whole field. Competitive-adjusted, not zero-sum.
fn competitive_reward(rewards: &[f64], searcher: usize) -> f64 {
    let own = rewards[searcher];
    let opponents: Vec<f64> = rewards
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != searcher)
        .map(|(_, r)| *r)
        .collect();
    if opponents.is_empty() {
        return own;
    }

    let threats: Vec<f64> = opponents
        .iter()
        .copied()
        .filter(|r| *r > THREAT_RATIO * own)
        .collect();

    let pool = if threats.is_empty() { &opponents } else { &threats };
    own - pool.iter().sum::<f64>() / pool.len() as f64
}
