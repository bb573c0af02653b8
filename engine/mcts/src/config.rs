//! Search configuration: struct, defaults, TOML loading and environment
//! overrides.
//!
//! Settings are resolved with the following priority (highest first):
//!
//! 1. Environment variables (`MOSAIC_MCTS_<KEY>`)
//! 2. TOML file (`MOSAIC_CONFIG` path, then the search path list)
//! 3. Built-in defaults

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

/// Rollout policy and reward composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Uniformly random rollouts, reward from the pre-rollout state only.
    Easy,
    /// Deterministic greedy rollouts (always the top-ranked candidate),
    /// reward = pre-rollout + terminal evaluation.
    #[default]
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// ============================================================================

fn d_difficulty() -> Difficulty {
    Difficulty::default()
}
fn d_iterations_per_batch() -> usize {
    20
}
fn d_min_iterations() -> usize {
    200
}
fn d_min_think_time_ms() -> u64 {
    1000
}
fn d_exploration_constant() -> f64 {
    2.0 * std::f64::consts::SQRT_2
}

/// Configuration for the search scheduler and engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Difficulty controlling the rollout policy and reward composition.
    #[serde(default = "d_difficulty")]
    pub difficulty: Difficulty,

    /// Engine iterations run per `step` call. Bounds how long a single
    /// frame is blocked by the search.
    #[serde(default = "d_iterations_per_batch")]
    pub iterations_per_batch: usize,

    /// Iteration floor before a move may commit.
    #[serde(default = "d_min_iterations")]
    pub min_iterations: usize,

    /// Minimum elapsed "thinking" time before a move may commit, in
    /// milliseconds. Purely a UX delay so computer players do not act
    /// instantly.
    #[serde(default = "d_min_think_time_ms")]
    pub min_think_time_ms: u64,

    /// UCB1 exploration constant `C`.
    #[serde(default = "d_exploration_constant")]
    pub exploration_constant: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            difficulty: d_difficulty(),
            iterations_per_batch: d_iterations_per_batch(),
            min_iterations: d_min_iterations(),
            min_think_time_ms: d_min_think_time_ms(),
            exploration_constant: d_exploration_constant(),
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing: tiny floors, no thinking delay.
    pub fn for_testing() -> Self {
        Self {
            min_iterations: 20,
            min_think_time_ms: 0,
            ..Self::default()
        }
    }

    /// Builder pattern: set difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder pattern: set iterations per batch.
    pub fn with_iterations_per_batch(mut self, n: usize) -> Self {
        self.iterations_per_batch = n;
        self
    }

    /// Builder pattern: set the iteration commit floor.
    pub fn with_min_iterations(mut self, n: usize) -> Self {
        self.min_iterations = n;
        self
    }

    /// Builder pattern: set the minimum thinking time.
    pub fn with_min_think_time(mut self, d: Duration) -> Self {
        self.min_think_time_ms = d.as_millis() as u64;
        self
    }

    /// Builder pattern: set the UCB1 exploration constant.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// The minimum thinking time as a `Duration`.
    pub fn min_think_time(&self) -> Duration {
        Duration::from_millis(self.min_think_time_ms)
    }
}

/// Standard locations to search for the config file.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["mosaic.toml", "../mosaic.toml"];

/// Load the search configuration.
///
/// Searches in the following order:
/// 1. Path specified by the `MOSAIC_CONFIG` environment variable
/// 2. The entries of [`CONFIG_SEARCH_PATHS`]
///
/// After loading, `MOSAIC_MCTS_*` environment overrides are applied. A
/// missing or malformed file falls back to defaults with a warning; the
/// host loop must never crash over configuration.
pub fn load_config() -> SearchConfig {
    if let Ok(path) = std::env::var("MOSAIC_CONFIG") {
        let path = Path::new(&path);
        if path.exists() {
            info!("loading config from MOSAIC_CONFIG: {}", path.display());
            return load_from_path(path);
        }
        warn!(
            "MOSAIC_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("no config file found, using built-in defaults");
    apply_env_overrides(SearchConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> SearchConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(SearchConfig::default())
            }
        },
        Err(e) => {
            warn!("failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(SearchConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    ($config:expr, $field:ident, $key:expr) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: `MOSAIC_MCTS_<KEY>`.
pub fn apply_env_overrides(mut config: SearchConfig) -> SearchConfig {
    env_override!(config, difficulty, "MOSAIC_MCTS_DIFFICULTY");
    env_override!(
        config,
        iterations_per_batch,
        "MOSAIC_MCTS_ITERATIONS_PER_BATCH"
    );
    env_override!(config, min_iterations, "MOSAIC_MCTS_MIN_ITERATIONS");
    env_override!(config, min_think_time_ms, "MOSAIC_MCTS_MIN_THINK_TIME_MS");
    env_override!(
        config,
        exploration_constant,
        "MOSAIC_MCTS_EXPLORATION_CONSTANT"
    );
    config
}
