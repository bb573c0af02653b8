//! Per-player board state: wall, pattern lines and floor line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::{Color, TileCounts};
use crate::{BOARD_SIZE, FLOOR_CAPACITY};

/// Reasons a pattern line rejects a set of same-colored tiles.
///
/// The legality of a destination is decided by these explicit predicates
/// before any mutation happens; move application never discovers
/// illegality halfway through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The line already holds tiles of a different color.
    #[error("pattern line {line} holds {held:?}, cannot accept {offered:?}")]
    ColorMismatch {
        line: u8,
        held: Color,
        offered: Color,
    },

    /// The line is at capacity (count == line index).
    #[error("pattern line {line} is full")]
    LineFull { line: u8 },

    /// The wall row fed by this line already contains the color.
    #[error("wall row {row} already holds {color:?}")]
    ColorOnWall { row: usize, color: Color },
}

/// The 5×5 wall grid. Cells are append-only: once a tile is placed it is
/// never cleared.
///
/// The wall pattern is fixed: the cell at `(row, col)` accepts exactly
/// `Color::ALL[(col + 5 - row) % 5]`, so each row and each column holds
/// each color at most once and occupancy alone determines the color of a
/// filled cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    filled: [[bool; BOARD_SIZE]; BOARD_SIZE],
}

impl Wall {
    /// Empty wall.
    pub const fn new() -> Self {
        Self {
            filled: [[false; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The color the fixed pattern assigns to `(row, col)`.
    #[inline]
    pub fn pattern_color(row: usize, col: usize) -> Color {
        Color::from_index((col + BOARD_SIZE - row) % BOARD_SIZE)
    }

    /// The column where `color` sits in `row` under the fixed pattern.
    #[inline]
    pub fn column_of(row: usize, color: Color) -> usize {
        (color.index() + row) % BOARD_SIZE
    }

    /// Contents of a cell: the pattern color if filled, `None` otherwise.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<Color> {
        self.filled[row][col].then(|| Self::pattern_color(row, col))
    }

    /// True if `row` already holds a tile of `color`.
    #[inline]
    pub fn row_has_color(&self, row: usize, color: Color) -> bool {
        self.filled[row][Self::column_of(row, color)]
    }

    /// Place a tile of `color` in `row` at its patterned column.
    pub fn place(&mut self, row: usize, color: Color) {
        self.filled[row][Self::column_of(row, color)] = true;
    }

    /// True if every cell of `row` is filled.
    pub fn is_row_complete(&self, row: usize) -> bool {
        self.filled[row].iter().all(|&f| f)
    }

    /// True if every cell of `col` is filled.
    pub fn is_col_complete(&self, col: usize) -> bool {
        (0..BOARD_SIZE).all(|row| self.filled[row][col])
    }

    /// True if all five instances of `color` are placed.
    pub fn is_color_complete(&self, color: Color) -> bool {
        (0..BOARD_SIZE).all(|row| self.row_has_color(row, color))
    }

    /// Number of tiles of `color` on the wall (0..=5).
    pub fn color_count(&self, color: Color) -> u8 {
        (0..BOARD_SIZE)
            .filter(|&row| self.row_has_color(row, color))
            .count() as u8
    }
}

/// One pattern line. Line *i* (1-based) holds up to *i* tiles of a single
/// color; the color is fixed by the first tile placed and only reset when
/// the external resolution step clears the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLine {
    /// Color held, `None` while empty.
    pub color: Option<Color>,
    /// Tiles currently on the line.
    pub count: u8,
}

impl PatternLine {
    /// Empty line.
    pub const fn new() -> Self {
        Self {
            color: None,
            count: 0,
        }
    }
}

/// The floor line (penalty row, destination index 0). Holds up to
/// [`FLOOR_CAPACITY`] slots shared by tiles of any color and the
/// first-player marker; anything past capacity is discarded by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorLine {
    /// Colored tiles on the floor.
    pub tiles: TileCounts,
    /// Whether the first-player marker occupies a slot.
    pub marker: bool,
}

impl FloorLine {
    /// Empty floor line.
    pub const fn new() -> Self {
        Self {
            tiles: TileCounts::new(),
            marker: false,
        }
    }

    /// Occupied slots, marker included.
    pub fn len(&self) -> u8 {
        self.tiles.total() + u8::from(self.marker)
    }

    /// True if nothing occupies the floor line.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining free slots.
    pub fn free_slots(&self) -> u8 {
        FLOOR_CAPACITY - self.len()
    }

    /// Push one tile of `color`, returning `false` if the line was full
    /// (the tile then belongs in the discard).
    pub fn push_tile(&mut self, color: Color) -> bool {
        if self.len() < FLOOR_CAPACITY {
            self.tiles.add(color, 1);
            true
        } else {
            false
        }
    }

    /// Push the marker token if there is room. A marker that finds no room
    /// simply vanishes; it is not a tile and does not affect conservation.
    pub fn push_marker(&mut self) {
        if self.len() < FLOOR_CAPACITY {
            self.marker = true;
        }
    }
}

/// One player's board: wall, five pattern lines and the floor line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBoard {
    pub wall: Wall,
    /// Pattern lines, `lines[i]` being line index `i + 1` (capacity `i + 1`).
    pub lines: [PatternLine; BOARD_SIZE],
    pub floor: FloorLine,
}

impl PlayerBoard {
    /// Empty board.
    pub const fn new() -> Self {
        Self {
            wall: Wall::new(),
            lines: [PatternLine::new(); BOARD_SIZE],
            floor: FloorLine::new(),
        }
    }

    /// Pattern line by 1-based index.
    #[inline]
    pub fn line(&self, line: u8) -> &PatternLine {
        &self.lines[line as usize - 1]
    }

    /// Whether tiles of `color` may be placed on pattern line `line`
    /// (1-based). Distinguishes every rejection reason; the floor line
    /// (index 0) is always legal and is not handled here.
    pub fn check_placement(&self, line: u8, color: Color) -> Result<(), PlacementError> {
        let row = line as usize - 1;
        let slot = self.line(line);

        match slot.color {
            None => {
                if self.wall.row_has_color(row, color) {
                    Err(PlacementError::ColorOnWall { row, color })
                } else {
                    Ok(())
                }
            }
            Some(held) if held != color => Err(PlacementError::ColorMismatch {
                line,
                held,
                offered: color,
            }),
            Some(_) => {
                if slot.count >= line {
                    Err(PlacementError::LineFull { line })
                } else {
                    Ok(())
                }
            }
        }
    }
}
