//! Tile colors and multisets.
//!
//! Tiles come in five fixed colors. Communal pools and floor lines never
//! care about ordering, only about how many tiles of each color they hold,
//! so multisets are stored as fixed-size per-color count arrays.

use serde::{Deserialize, Serialize};

/// Number of distinct tile colors.
pub const NUM_COLORS: usize = 5;

/// A tile color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Yellow,
    Red,
    Green,
    Purple,
}

impl Color {
    /// All colors in canonical order. The wall pattern (see
    /// [`crate::board::Wall`]) is defined in terms of this ordering.
    pub const ALL: [Color; NUM_COLORS] = [
        Color::Blue,
        Color::Yellow,
        Color::Red,
        Color::Green,
        Color::Purple,
    ];

    /// Canonical index of this color (position in [`Color::ALL`]).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Color at a canonical index. Panics if `index >= NUM_COLORS`.
    #[inline]
    pub const fn from_index(index: usize) -> Color {
        Self::ALL[index]
    }
}

/// A multiset of colored tiles, stored as per-color counts.
///
/// Used for displays, the pot's tiles, floor-line contents and the
/// discard. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCounts([u8; NUM_COLORS]);

impl TileCounts {
    /// Empty multiset.
    pub const fn new() -> Self {
        Self([0; NUM_COLORS])
    }

    /// Number of tiles of `color`.
    #[inline]
    pub fn count(&self, color: Color) -> u8 {
        self.0[color.index()]
    }

    /// Total tile count across all colors.
    pub fn total(&self) -> u8 {
        self.0.iter().sum()
    }

    /// True if no tiles of any color are present.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// Add `n` tiles of `color`.
    pub fn add(&mut self, color: Color, n: u8) {
        self.0[color.index()] += n;
    }

    /// Remove every tile of `color`, returning how many were removed.
    pub fn take_all(&mut self, color: Color) -> u8 {
        let n = self.0[color.index()];
        self.0[color.index()] = 0;
        n
    }

    /// Move the entire contents of `self` into `other`, leaving `self`
    /// empty.
    pub fn drain_into(&mut self, other: &mut TileCounts) {
        for color in Color::ALL {
            let n = self.take_all(color);
            other.add(color, n);
        }
    }

    /// Iterate over the colors present (count > 0), in canonical order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|c| self.count(*c) > 0)
    }
}

impl FromIterator<Color> for TileCounts {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut counts = TileCounts::new();
        for color in iter {
            counts.add(color, 1);
        }
        counts
    }
}
