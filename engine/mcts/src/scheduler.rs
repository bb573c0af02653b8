//! Frame-sliced search scheduling.
//!
//! The host's render loop cannot block on a full search, so the scheduler
//! slices engine iterations into per-frame batches behind a small state
//! machine:
//!
//! ```text
//! Idle -> Accumulating -> Committed -> Idle
//!              |
//!              +-> Idle (cancel)
//! ```
//!
//! `step` is the only suspension point the host sees and returns after a
//! bounded batch of iterations. A move is committed only once both the
//! iteration floor and the minimum thinking time are satisfied, and the
//! committed move is handed out exactly once. Cancellation is checked
//! once per step, never mid-iteration, and a cancelled tree can never
//! leak a move: no partial state ever reaches the move executor.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, error, warn};

use mosaic_core::{Move, Snapshot};

use crate::config::SearchConfig;
use crate::search::Mcts;

enum State {
    /// No active tree.
    Idle,
    /// A tree is being grown batch by batch.
    Accumulating {
        search: Mcts,
        /// Host time accumulated since the search began.
        elapsed: Duration,
        /// Successful engine iterations so far.
        iterations: usize,
    },
    /// A decision is ready and will be handed out once.
    Committed { mv: Move },
}

/// Drives one search per computer turn, one batch per host tick.
pub struct Scheduler {
    config: SearchConfig,
    rng: ChaCha20Rng,
    state: State,
}

impl Scheduler {
    /// Create a scheduler with entropy-seeded rollouts.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Create with a specific seed for determinism (used in tests and
    /// replays; only easy rollouts ever draw from the RNG).
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(config: SearchConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            rng,
            state: State::Idle,
        }
    }

    /// Start deciding for `player` from `snapshot`.
    ///
    /// Any search still in flight is discarded first; the host signalling
    /// a new turn supersedes whatever the old tree was thinking about.
    pub fn begin_turn(&mut self, snapshot: Snapshot, player: usize) {
        if !matches!(self.state, State::Idle) {
            debug!("begin_turn while busy, discarding previous search");
        }

        let search = Mcts::new(
            snapshot,
            player,
            self.config.difficulty,
            self.config.exploration_constant,
        );
        debug!(player, "search started");
        self.state = State::Accumulating {
            search,
            elapsed: Duration::ZERO,
            iterations: 0,
        };
    }

    /// Whether a search is currently accumulating.
    pub fn is_thinking(&self) -> bool {
        matches!(self.state, State::Accumulating { .. })
    }

    /// Abort any in-progress search without exposing a move.
    pub fn cancel(&mut self) {
        if !matches!(self.state, State::Idle) {
            debug!("search cancelled");
        }
        self.state = State::Idle;
    }

    /// Advance by one batch. `dt` is the host frame delta, accumulated
    /// toward the minimum thinking time. Returns `Some(mv)` exactly on
    /// the tick where the decision commits, `None` otherwise.
    pub fn step(&mut self, dt: Duration) -> Option<Move> {
        if let State::Accumulating { .. } = self.state {
            self.accumulate(dt);
        }

        // Committed hands the move out exactly once, then the machine is
        // idle and the tree is already gone.
        if let State::Committed { mv } = &self.state {
            let mv = *mv;
            self.state = State::Idle;
            return Some(mv);
        }
        None
    }

    /// Run one batch of iterations and commit if the floors are met.
    fn accumulate(&mut self, dt: Duration) {
        let State::Accumulating {
            search,
            elapsed,
            iterations,
        } = &mut self.state
        else {
            return;
        };

        if search.root_is_terminal() {
            // The host should never request a decision for a finished
            // round; nothing can be committed from here.
            error!("search root is terminal, nothing to decide");
            self.state = State::Idle;
            return;
        }

        let batch = self.config.iterations_per_batch;
        let mut failures = 0usize;
        for _ in 0..batch {
            match search.iterate(&mut self.rng) {
                Ok(()) => *iterations += 1,
                Err(e) => {
                    warn!(error = %e, "search iteration failed");
                    failures += 1;
                }
            }
        }
        *elapsed += dt;

        let floors_met =
            *iterations >= self.config.min_iterations && *elapsed >= self.config.min_think_time();
        // A batch where every iteration failed will not improve: commit
        // the best move found so far instead of crashing the host loop.
        let batch_dead = failures > 0 && failures == batch;

        if floors_met || batch_dead {
            match search.best_move() {
                Some(mv) => {
                    debug!(
                        ?mv,
                        iterations = *iterations,
                        elapsed_ms = elapsed.as_millis() as u64,
                        nodes = search.tree().stats().total_nodes,
                        "decision committed"
                    );
                    self.state = State::Committed { mv };
                }
                None => {
                    error!("search has no children to commit");
                    self.state = State::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use mosaic_core::{legal_moves, Color, PlayerBoard, Pot, Snapshot, TileCounts};

    const FRAME: Duration = Duration::from_millis(16);

    fn counts(colors: &[Color]) -> TileCounts {
        colors.iter().copied().collect()
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![PlayerBoard::new(), PlayerBoard::new()],
            vec![
                counts(&[Color::Red, Color::Red, Color::Blue, Color::Blue]),
                counts(&[Color::Green, Color::Green, Color::Green, Color::Yellow]),
            ],
            Pot::with_marker(),
        )
        .unwrap()
    }

    fn terminal_snapshot() -> Snapshot {
        Snapshot::new(
            vec![PlayerBoard::new(), PlayerBoard::new()],
            vec![TileCounts::new()],
            Pot::default(),
        )
        .unwrap()
    }

    /// Step until a move commits, with a generous tick bound.
    fn run_to_commit(scheduler: &mut Scheduler) -> Option<Move> {
        for _ in 0..1000 {
            if let Some(mv) = scheduler.step(FRAME) {
                return Some(mv);
            }
        }
        None
    }

    #[test]
    fn test_idle_steps_return_none() {
        let mut scheduler = Scheduler::with_seed(SearchConfig::for_testing(), 0);
        assert!(!scheduler.is_thinking());
        assert_eq!(scheduler.step(FRAME), None);
        assert_eq!(scheduler.step(FRAME), None);
    }

    #[test]
    fn test_commits_once_then_goes_idle() {
        let mut scheduler = Scheduler::with_seed(SearchConfig::for_testing(), 0);
        scheduler.begin_turn(snapshot(), 0);
        assert!(scheduler.is_thinking());

        let mv = run_to_commit(&mut scheduler).expect("search must commit");
        assert!(!scheduler.is_thinking());

        // The committed move belongs to the root's legal set.
        assert!(legal_moves(&snapshot(), 0).contains(&mv));

        // Exactly once: further steps yield nothing.
        for _ in 0..10 {
            assert_eq!(scheduler.step(FRAME), None);
        }
    }

    #[test]
    fn test_iteration_floor_delays_commit() {
        let config = SearchConfig::for_testing()
            .with_iterations_per_batch(10)
            .with_min_iterations(100);
        let mut scheduler = Scheduler::with_seed(config, 0);
        scheduler.begin_turn(snapshot(), 0);

        // 100 iterations at 10 per batch: the first 9 steps cannot commit.
        for _ in 0..9 {
            assert_eq!(scheduler.step(FRAME), None);
        }
        assert!(scheduler.step(FRAME).is_some());
    }

    #[test]
    fn test_think_time_floor_delays_commit() {
        let config = SearchConfig::for_testing()
            .with_min_iterations(1)
            .with_min_think_time(Duration::from_millis(100));
        let mut scheduler = Scheduler::with_seed(config, 0);
        scheduler.begin_turn(snapshot(), 0);

        // 16ms per tick: six ticks accumulate only 96ms.
        for _ in 0..6 {
            assert_eq!(scheduler.step(FRAME), None);
        }
        assert!(scheduler.step(FRAME).is_some());
    }

    #[test]
    fn test_cancel_discards_search_without_exposing_a_move() {
        let mut scheduler = Scheduler::with_seed(SearchConfig::for_testing(), 0);
        scheduler.begin_turn(snapshot(), 0);

        scheduler.step(FRAME);
        scheduler.cancel();
        assert!(!scheduler.is_thinking());

        // The cancelled tree can never surface a decision.
        for _ in 0..20 {
            assert_eq!(scheduler.step(FRAME), None);
        }
    }

    #[test]
    fn test_cancel_when_idle_is_harmless() {
        let mut scheduler = Scheduler::with_seed(SearchConfig::for_testing(), 0);
        scheduler.cancel();
        assert_eq!(scheduler.step(FRAME), None);
    }

    #[test]
    fn test_terminal_root_commits_nothing() {
        let mut scheduler = Scheduler::with_seed(SearchConfig::for_testing(), 0);
        scheduler.begin_turn(terminal_snapshot(), 0);

        assert_eq!(scheduler.step(FRAME), None);
        assert!(!scheduler.is_thinking());
    }

    #[test]
    fn test_begin_turn_supersedes_previous_search() {
        // Floors high enough that the first search cannot commit on its
        // first batch.
        let config = SearchConfig::for_testing().with_min_iterations(200);
        let mut scheduler = Scheduler::with_seed(config, 0);
        scheduler.begin_turn(snapshot(), 0);
        assert_eq!(scheduler.step(FRAME), None);

        // Restart for the other player before the first search commits.
        scheduler.begin_turn(snapshot(), 1);
        let mv = run_to_commit(&mut scheduler).expect("second search commits");
        assert!(legal_moves(&snapshot(), 1).contains(&mv));
    }

    #[test]
    fn test_hard_decisions_are_reproducible() {
        let decide = |seed: u64| {
            let config = SearchConfig::for_testing().with_difficulty(Difficulty::Hard);
            let mut scheduler = Scheduler::with_seed(config, seed);
            scheduler.begin_turn(snapshot(), 0);
            run_to_commit(&mut scheduler).unwrap()
        };

        assert_eq!(decide(11), decide(11));
    }

    #[test]
    fn test_easy_decisions_are_reproducible_with_fixed_seed() {
        let decide = || {
            let config = SearchConfig::for_testing().with_difficulty(Difficulty::Easy);
            let mut scheduler = Scheduler::with_seed(config, 1234);
            scheduler.begin_turn(snapshot(), 0);
            run_to_commit(&mut scheduler).unwrap()
        };

        assert_eq!(decide(), decide());
    }
}
