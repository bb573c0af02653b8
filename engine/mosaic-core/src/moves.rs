//! Legal-move enumeration, ranking, and pure move application.
//!
//! A move always takes *all* tiles of one color from one source (the game
//! disallows partial takes) and places them on one destination line of the
//! mover's board. Destination 0 is the floor line and is always legal;
//! destinations 1..5 are the pattern lines, gated by
//! [`crate::PlayerBoard::check_placement`].

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::tile::{Color, TileCounts};
use crate::BOARD_SIZE;

/// Destination index of the floor line.
pub const FLOOR_LINE: u8 = 0;

/// Where a move takes its tiles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// One of the communal displays, by index.
    Display(u8),
    /// The communal pot.
    Pot,
}

/// One candidate move for the player to move: take every `color` tile from
/// `source` and place them on destination `line` (0 = floor, 1..=5 =
/// pattern lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub source: Source,
    pub color: Color,
    pub line: u8,
}

/// Candidate with its ranking facts, kept internal to the sort.
struct Candidate {
    mv: Move,
    quantity: u8,
    exact_fill: bool,
}

impl Candidate {
    /// Ranking group: wall-destined exact fills first, then other
    /// wall-destined moves, then floor-line fallbacks.
    fn group(&self) -> u8 {
        if self.mv.line == FLOOR_LINE {
            2
        } else if self.exact_fill {
            0
        } else {
            1
        }
    }
}

/// Enumerate and rank the legal moves for `player`.
///
/// The returned order is a design decision, not an optimality claim: it
/// drives both the expansion order of the search tree and the greedy
/// rollout policy. Within each group candidates are ordered by quantity
/// taken, descending; ties keep source enumeration order, so the result
/// is fully deterministic for a given snapshot.
///
/// Returns an empty list exactly when the snapshot is terminal.
pub fn legal_moves(snapshot: &Snapshot, player: usize) -> Vec<Move> {
    let board = snapshot.board(player);
    let mut candidates = Vec::new();

    let mut add_source = |source: Source, tiles: &TileCounts| {
        for color in tiles.colors() {
            let quantity = tiles.count(color);
            for line in 1..=BOARD_SIZE as u8 {
                if board.check_placement(line, color).is_ok() {
                    let existing = board.line(line).count;
                    candidates.push(Candidate {
                        mv: Move {
                            source,
                            color,
                            line,
                        },
                        quantity,
                        exact_fill: existing + quantity == line,
                    });
                }
            }
            // The floor line is always a legal fallback.
            candidates.push(Candidate {
                mv: Move {
                    source,
                    color,
                    line: FLOOR_LINE,
                },
                quantity,
                exact_fill: false,
            });
        }
    };

    for (i, display) in snapshot.displays().iter().enumerate() {
        if !display.is_empty() {
            add_source(Source::Display(i as u8), display);
        }
    }
    if !snapshot.pot().tiles.is_empty() {
        add_source(Source::Pot, &snapshot.pot().tiles);
    }

    // Stable sort: group, then quantity descending; enumeration order
    // breaks remaining ties.
    candidates.sort_by_key(|c| (c.group(), Reverse(c.quantity)));
    candidates.into_iter().map(|c| c.mv).collect()
}

/// Apply `mv` for `player`, producing a new snapshot. The input snapshot
/// is never touched.
///
/// Semantics:
/// - every tile of the move's color leaves the source;
/// - a display's leftover tiles flow into the pot;
/// - taking from the pot while the marker is present routes the marker to
///   the mover's floor line first;
/// - tiles land on the destination pattern line until it reaches capacity,
///   then overflow to the floor line, then to the discard.
///
/// The move is assumed legal for this snapshot (the generator only emits
/// legal moves); debug builds assert it.
pub fn apply_move(snapshot: &Snapshot, player: usize, mv: Move) -> Snapshot {
    debug_assert!(
        mv.line == FLOOR_LINE
            || snapshot
                .board(player)
                .check_placement(mv.line, mv.color)
                .is_ok(),
        "apply_move called with illegal move {:?}",
        mv
    );

    let mut next = snapshot.clone();

    // Take the tiles out of the source.
    let taken = match mv.source {
        Source::Display(i) => {
            let display = next.display_mut(i as usize);
            let taken = display.take_all(mv.color);
            // Leftovers from a display always move into the pot.
            let mut leftovers = *display;
            *display = TileCounts::new();
            leftovers.drain_into(&mut next.pot_mut().tiles);
            taken
        }
        Source::Pot => {
            let pot = next.pot_mut();
            let taken = pot.tiles.take_all(mv.color);
            let had_marker = pot.marker;
            pot.marker = false;
            if had_marker {
                next.board_mut(player).floor.push_marker();
            }
            taken
        }
    };
    debug_assert!(taken > 0, "move takes from an empty source: {:?}", mv);

    // Place the tiles, spilling line -> floor -> discard.
    let mut overflow = 0u8;
    {
        let board = next.board_mut(player);
        let mut remaining = taken;

        if mv.line != FLOOR_LINE {
            let slot = &mut board.lines[mv.line as usize - 1];
            slot.color = Some(mv.color);
            let room = mv.line - slot.count;
            let onto_line = remaining.min(room);
            slot.count += onto_line;
            remaining -= onto_line;
        }
        for _ in 0..remaining {
            if !board.floor.push_tile(mv.color) {
                overflow += 1;
            }
        }
    }
    if overflow > 0 {
        next.discard_mut().add(mv.color, overflow);
    }

    next
}
