//! Heuristic reward evaluation.
//!
//! Scores a snapshot for every player at once. This is a proxy used to
//! steer the search, deliberately cheaper and fuzzier than the real
//! end-of-round resolution, which stays outside the engine: pattern lines
//! are scored *as if* their tiles had already transferred to the wall, and
//! the floor penalty uses the marginal schedule value at the final
//! occupancy rather than replaying the resolution.

use crate::board::Wall;
use crate::snapshot::Snapshot;
use crate::tile::Color;
use crate::BOARD_SIZE;

/// Marginal floor-line penalty by occupancy (index = occupancy - 1).
const FLOOR_PENALTIES: [f64; 7] = [-1.0, -1.0, -2.0, -2.0, -2.0, -3.0, -3.0];

/// Bonus for a wall row holding all five colors.
const ROW_BONUS: f64 = 2.0;

/// Extra incentive when a completed row puts the player in the lead.
const LEAD_BONUS: f64 = 5.0;

/// Bonus for a complete wall column.
const COL_BONUS: f64 = 7.0;

/// Bonus for placing all five instances of one color.
const COLOR_BONUS: f64 = 10.0;

/// Heuristic score for one player per snapshot, in seating order.
pub fn evaluate(snapshot: &Snapshot) -> Vec<f64> {
    let mut scores = vec![0.0; snapshot.num_players()];

    for (i, board) in snapshot.boards().iter().enumerate() {
        // Score exactly-full pattern lines as virtual wall placements.
        // Placements accumulate, so two full lines see each other's tiles
        // when counting adjacency.
        let mut virtual_wall = board.wall;
        for (idx, slot) in board.lines.iter().enumerate() {
            let line = idx as u8 + 1;
            match slot.color {
                Some(color) if slot.count == line => {
                    let col = Wall::column_of(idx, color);
                    virtual_wall.place(idx, color);
                    scores[i] += adjacency_score(&virtual_wall, idx, col) + f64::from(line - 1);
                }
                // Idle partial lines drag the score down a little so the
                // search prefers finishing what it started.
                _ => scores[i] -= f64::from(slot.count) / 3.0,
            }
        }

        // Completed-row bonus, with an extra push when the row puts this
        // player at the top of the running totals.
        for row in 0..BOARD_SIZE {
            if board.wall.is_row_complete(row) {
                scores[i] += ROW_BONUS;
                let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if scores[i] >= max {
                    scores[i] += LEAD_BONUS;
                }
            }
        }

        for col in 0..BOARD_SIZE {
            if board.wall.is_col_complete(col) {
                scores[i] += COL_BONUS;
            }
        }

        for color in Color::ALL {
            if board.wall.is_color_complete(color) {
                scores[i] += COLOR_BONUS;
            }
        }

        let floor_len = board.floor.len();
        if floor_len > 0 {
            let idx = usize::from(floor_len - 1).min(FLOOR_PENALTIES.len() - 1);
            scores[i] += FLOOR_PENALTIES[idx];
        }
    }

    scores
}

/// Adjacency value of the tile at `(row, col)`: 1 for the tile itself,
/// plus contiguous same-row neighbors in both directions, plus contiguous
/// same-column neighbors when any exist.
fn adjacency_score(wall: &Wall, row: usize, col: usize) -> f64 {
    let mut score = 1.0;

    let mut c = col;
    while c > 0 && wall.cell(row, c - 1).is_some() {
        score += 1.0;
        c -= 1;
    }
    let mut c = col + 1;
    while c < BOARD_SIZE && wall.cell(row, c).is_some() {
        score += 1.0;
        c += 1;
    }

    let mut vertical = 0.0;
    let mut r = row;
    while r > 0 && wall.cell(r - 1, col).is_some() {
        vertical += 1.0;
        r -= 1;
    }
    let mut r = row + 1;
    while r < BOARD_SIZE && wall.cell(r, col).is_some() {
        vertical += 1.0;
        r += 1;
    }
    if vertical > 0.0 {
        score += vertical;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PatternLine, PlayerBoard};
    use crate::snapshot::Pot;

    fn snapshot(boards: Vec<PlayerBoard>) -> Snapshot {
        Snapshot::new(boards, vec![], Pot::default()).unwrap()
    }

    fn empty_boards(n: usize) -> Vec<PlayerBoard> {
        vec![PlayerBoard::new(); n]
    }

    #[test]
    fn test_empty_state_scores_zero() {
        let snap = snapshot(empty_boards(2));
        assert_eq!(evaluate(&snap), vec![0.0, 0.0]);
    }

    #[test]
    fn test_lone_full_line_scores_one_plus_placement_bonus() {
        let mut boards = empty_boards(2);
        boards[0].lines[2] = PatternLine {
            color: Some(Color::Red),
            count: 3,
        };
        let snap = snapshot(boards);
        // Adjacency 1 (no neighbors) + placement bonus (3 - 1).
        assert_eq!(evaluate(&snap)[0], 3.0);
    }

    #[test]
    fn test_partial_line_penalized_by_fill_count() {
        let mut boards = empty_boards(2);
        boards[0].lines[3] = PatternLine {
            color: Some(Color::Blue),
            count: 2,
        };
        let snap = snapshot(boards);
        assert!((evaluate(&snap)[0] - (-2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_adjacency_counts_both_axes() {
        let mut wall = Wall::new();
        // Tile at (2, 2) with both horizontal neighbors and one below.
        for (row, col) in [(2, 2), (2, 1), (2, 3), (3, 2)] {
            wall.place(row, Wall::pattern_color(row, col));
        }

        // 1 (tile) + 2 horizontal + 1 vertical.
        assert_eq!(adjacency_score(&wall, 2, 2), 4.0);
    }

    #[test]
    fn test_adjacency_lone_tile_scores_one() {
        let mut wall = Wall::new();
        wall.place(0, Wall::pattern_color(0, 0));
        assert_eq!(adjacency_score(&wall, 0, 0), 1.0);
    }

    #[test]
    fn test_full_lines_see_each_other_in_adjacency() {
        // Lines 1 and 2 both full with colors that land in adjacent rows
        // of the same column.
        let color1 = Wall::pattern_color(0, 1);
        let color2 = Wall::pattern_color(1, 1);
        let mut boards = empty_boards(2);
        boards[0].lines[0] = PatternLine {
            color: Some(color1),
            count: 1,
        };
        boards[0].lines[1] = PatternLine {
            color: Some(color2),
            count: 2,
        };
        let snap = snapshot(boards);

        // Line 1: lone tile = 1, bonus 0. Line 2: tile + vertical
        // neighbor from line 1's virtual placement = 2, bonus 1.
        assert_eq!(evaluate(&snap)[0], 1.0 + 3.0);
    }

    #[test]
    fn test_completed_row_awards_bonus_and_lead_incentive() {
        let mut boards = empty_boards(2);
        for color in Color::ALL {
            boards[0].wall.place(1, color);
        }
        let snap = snapshot(boards);

        let scores = evaluate(&snap);
        // +2 for the row and +5 because that makes player 0 the leader.
        assert_eq!(scores[0], ROW_BONUS + LEAD_BONUS);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_row_bonus_without_lead_incentive() {
        // Player 0 (scored first) holds a big lead; player 1's completed
        // row earns +2 but no lead bonus.
        let mut boards = empty_boards(2);
        for color in Color::ALL {
            boards[0].wall.place(0, color);
            boards[0].wall.place(2, color);
            boards[1].wall.place(1, color);
        }
        let snap = snapshot(boards);

        let scores = evaluate(&snap);
        assert!(scores[0] > scores[1]);
        // Two rows, lead bonus on each (running total stays max).
        assert_eq!(scores[0], 2.0 * (ROW_BONUS + LEAD_BONUS));
        assert_eq!(scores[1], ROW_BONUS);
    }

    #[test]
    fn test_column_and_color_bonuses() {
        let mut boards = empty_boards(2);
        // Fill column 0 completely.
        for row in 0..BOARD_SIZE {
            boards[0].wall.place(row, Wall::pattern_color(row, 0));
        }
        let snap = snapshot(boards);
        assert_eq!(evaluate(&snap)[0], COL_BONUS);

        let mut boards = empty_boards(2);
        // All five greens.
        for row in 0..BOARD_SIZE {
            boards[0].wall.place(row, Color::Green);
        }
        let snap = snapshot(boards);
        assert_eq!(evaluate(&snap)[0], COLOR_BONUS);
    }

    #[test]
    fn test_floor_penalty_uses_schedule_value_at_final_count() {
        // Five floor tiles: the schedule value at index 4 is -2, not the
        // prefix sum of the first five entries.
        let mut boards = empty_boards(2);
        for _ in 0..5 {
            boards[0].floor.push_tile(Color::Yellow);
        }
        let snap = snapshot(boards);
        assert_eq!(evaluate(&snap)[0], -2.0);
    }

    #[test]
    fn test_floor_penalty_counts_marker_slot() {
        let mut boards = empty_boards(2);
        boards[0].floor.push_marker();
        let snap = snapshot(boards);
        assert_eq!(evaluate(&snap)[0], -1.0);
    }

    #[test]
    fn test_floor_penalty_saturates_at_schedule_end() {
        let mut boards = empty_boards(2);
        for _ in 0..7 {
            boards[0].floor.push_tile(Color::Purple);
        }
        let snap = snapshot(boards);
        assert_eq!(evaluate(&snap)[0], -3.0);
    }
}
