//! Immutable snapshots of the full game state.
//!
//! A [`Snapshot`] is built once per turn-decision request from host-side
//! data and is the only view of the game the search ever sees. Host data
//! crosses a trust boundary, so construction validates the structural
//! invariants and returns a typed error instead of panicking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::PlayerBoard;
use crate::tile::{Color, TileCounts};
use crate::FLOOR_CAPACITY;

/// Errors rejected at snapshot construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The game needs at least two players.
    #[error("snapshot needs at least 2 players, got {0}")]
    TooFewPlayers(usize),

    /// A pattern line holds more tiles than its index allows.
    #[error("player {player} pattern line {line} holds {count} tiles (capacity {line})")]
    PatternLineOverflow { player: usize, line: u8, count: u8 },

    /// A floor line holds more than [`FLOOR_CAPACITY`] slots.
    #[error("player {player} floor line holds {len} slots (capacity {capacity})")]
    FloorOverflow { player: usize, len: u8, capacity: u8 },
}

/// The communal pot: overflow tiles from displays plus at most one
/// first-player marker token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    /// Colored tiles in the pot.
    pub tiles: TileCounts,
    /// Whether the marker token is still in the pot.
    pub marker: bool,
}

impl Pot {
    /// Empty pot with the marker present (round-start configuration).
    pub const fn with_marker() -> Self {
        Self {
            tiles: TileCounts::new(),
            marker: true,
        }
    }
}

/// Immutable value copy of the full game state: every player board, every
/// display, the pot, and the discard.
///
/// Snapshots are never mutated in place; [`crate::apply_move`] clones and
/// returns a new one, so sibling search nodes share nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    boards: Vec<PlayerBoard>,
    displays: Vec<TileCounts>,
    pot: Pot,
    /// Tiles that overflowed a full floor line (the physical game's box
    /// lid). Kept so per-color conservation holds on every reachable
    /// state.
    discard: TileCounts,
}

impl Snapshot {
    /// Build a snapshot from host-side data, validating structural
    /// invariants.
    pub fn new(
        boards: Vec<PlayerBoard>,
        displays: Vec<TileCounts>,
        pot: Pot,
    ) -> Result<Self, SnapshotError> {
        if boards.len() < 2 {
            return Err(SnapshotError::TooFewPlayers(boards.len()));
        }
        for (player, board) in boards.iter().enumerate() {
            for (i, slot) in board.lines.iter().enumerate() {
                let line = i as u8 + 1;
                if slot.count > line {
                    return Err(SnapshotError::PatternLineOverflow {
                        player,
                        line,
                        count: slot.count,
                    });
                }
            }
            if board.floor.len() > FLOOR_CAPACITY {
                return Err(SnapshotError::FloorOverflow {
                    player,
                    len: board.floor.len(),
                    capacity: FLOOR_CAPACITY,
                });
            }
        }

        Ok(Self {
            boards,
            displays,
            pot,
            discard: TileCounts::new(),
        })
    }

    /// Number of players.
    #[inline]
    pub fn num_players(&self) -> usize {
        self.boards.len()
    }

    /// Player whose turn follows `player` in seating order.
    #[inline]
    pub fn next_player(&self, player: usize) -> usize {
        (player + 1) % self.num_players()
    }

    /// A player's board.
    #[inline]
    pub fn board(&self, player: usize) -> &PlayerBoard {
        &self.boards[player]
    }

    /// All player boards in seating order.
    pub fn boards(&self) -> &[PlayerBoard] {
        &self.boards
    }

    /// The displays.
    pub fn displays(&self) -> &[TileCounts] {
        &self.displays
    }

    /// The pot.
    pub fn pot(&self) -> &Pot {
        &self.pot
    }

    /// The discard (floor overflow).
    pub fn discard(&self) -> &TileCounts {
        &self.discard
    }

    /// Terminal iff every display is empty and the pot holds no colored
    /// tile. A lone marker cannot be taken by itself, so it does not keep
    /// the state alive.
    pub fn is_terminal(&self) -> bool {
        self.displays.iter().all(TileCounts::is_empty) && self.pot.tiles.is_empty()
    }

    /// Total number of tiles of `color` across every container, walls and
    /// discard included. Constant under move application.
    pub fn total_tiles(&self, color: Color) -> u32 {
        let mut total = u32::from(self.pot.tiles.count(color)) + u32::from(self.discard.count(color));
        for display in &self.displays {
            total += u32::from(display.count(color));
        }
        for board in &self.boards {
            total += u32::from(board.wall.color_count(color));
            total += u32::from(board.floor.tiles.count(color));
            for slot in &board.lines {
                if slot.color == Some(color) {
                    total += u32::from(slot.count);
                }
            }
        }
        total
    }

    // Crate-internal mutable access for move application, which operates
    // on a private clone and publishes it as a fresh snapshot.
    pub(crate) fn board_mut(&mut self, player: usize) -> &mut PlayerBoard {
        &mut self.boards[player]
    }

    pub(crate) fn display_mut(&mut self, display: usize) -> &mut TileCounts {
        &mut self.displays[display]
    }

    pub(crate) fn pot_mut(&mut self) -> &mut Pot {
        &mut self.pot
    }

    pub(crate) fn discard_mut(&mut self) -> &mut TileCounts {
        &mut self.discard
    }
}
