//! Monte Carlo Tree Search for the mosaic tile-drafting engine.
//!
//! This crate decides moves for computer-controlled players. Searching a
//! multi-agent, turn-alternating state space is too slow to finish inside
//! one frame, so the search is sliced: the host calls
//! [`Scheduler::step`] once per tick, each call runs a bounded batch of
//! iterations, and a single committed [`mosaic_core::Move`] is handed out
//! once both the iteration floor and the minimum "thinking" time are met.
//!
//! # Overview
//!
//! One search iteration has four phases:
//!
//! 1. **Selection**: descend from the root by UCB1 while nodes are fully
//!    expanded
//! 2. **Expansion**: add a child for the first untried candidate move, in
//!    the move generator's ranked order (deterministic on purpose)
//! 3. **Simulation**: roll the state out to terminal with the
//!    difficulty's policy and score it with the heuristic evaluator
//! 4. **Backpropagation**: add the competitive-adjusted scalar along the
//!    path to the root
//!
//! Rewards are always expressed relative to the searching player; this
//! is a multi-player game, not a two-player zero-sum one, so values are
//! never negated between plies.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{Scheduler, SearchConfig};
//! use std::time::Duration;
//!
//! let mut scheduler = Scheduler::new(SearchConfig::default());
//!
//! // When a computer player's turn starts:
//! scheduler.begin_turn(snapshot, player);
//!
//! // Once per frame:
//! if let Some(mv) = scheduler.step(frame_dt) {
//!     // hand `mv` to the move executor
//! }
//! ```
//!
//! # Configuration
//!
//! [`SearchConfig`] controls search behavior and can be loaded from a
//! TOML file with `MOSAIC_MCTS_*` environment overrides:
//!
//! - `difficulty`: rollout policy and reward composition (easy | hard)
//! - `iterations_per_batch`: iterations run per `step` call (default: 20)
//! - `min_iterations` / `min_think_time_ms`: commit floors
//! - `exploration_constant`: UCB1 `C` (default: 2·√2)

pub mod config;
pub mod node;
pub mod scheduler;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{load_config, Difficulty, SearchConfig};
pub use node::{Node, NodeId};
pub use scheduler::Scheduler;
pub use search::{Mcts, SearchError};
pub use tree::{SearchTree, TreeStats};
