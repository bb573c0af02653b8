//! Game data model for the mosaic tile-drafting engine.
//!
//! This crate owns everything the search layer needs to reason about the
//! game without touching live UI objects:
//!
//! - [`Snapshot`]: an immutable value copy of the full game state, built
//!   once per turn-decision request from host-side data
//! - [`Move`] and [`legal_moves`]: candidate enumeration and ranking for
//!   the player to move
//! - [`apply_move`]: pure move semantics producing a new snapshot
//! - [`evaluate`]: the heuristic per-player reward used by the search
//!
//! The authoritative game (round resolution, real scoring, the renderer)
//! lives outside this crate and only ever receives a single committed
//! [`Move`] back.

pub mod board;
pub mod eval;
pub mod moves;
pub mod snapshot;
pub mod tile;

// Re-export main types for convenience
pub use board::{FloorLine, PatternLine, PlacementError, PlayerBoard, Wall};
pub use eval::evaluate;
pub use moves::{apply_move, legal_moves, Move, Source};
pub use snapshot::{Pot, Snapshot, SnapshotError};
pub use tile::{Color, TileCounts, NUM_COLORS};

/// Board side length: five wall rows/columns and five pattern lines.
pub const BOARD_SIZE: usize = 5;

/// Floor line capacity (slots shared by tiles and the marker token).
pub const FLOOR_CAPACITY: u8 = 7;

/// Tiles dealt onto each display at round start.
pub const DISPLAY_CAPACITY: u8 = 4;
