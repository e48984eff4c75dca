//! Difficulty presets for the search.
//!
//! Each preset fixes the iteration budget and the UCT exploration constant.

use std::time::Duration;

use clap::ValueEnum;

/// Named search strength.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Tunable parameters of one search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchSettings {
    /// Number of select/expand/simulate/backpropagate iterations.
    pub iterations: usize,
    /// Weight of the exploration term in UCT.
    pub exploration: f64,
    /// Optional wall-clock limit, checked between iterations. The iteration
    /// budget still applies when set.
    pub time_limit: Option<Duration>,
}

impl SearchSettings {
    /// Settings with no time limit.
    pub const fn new(iterations: usize, exploration: f64) -> Self {
        Self {
            iterations,
            exploration,
            time_limit: None,
        }
    }

    /// The same settings with a wall-clock limit added.
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Difficulty::default().settings()
    }
}

impl Difficulty {
    /// Every preset, weakest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Search settings for this preset.
    pub const fn settings(self) -> SearchSettings {
        match self {
            Difficulty::Easy => SearchSettings::new(50, 2.236_067_977_499_79),
            Difficulty::Medium => SearchSettings::new(400, std::f64::consts::SQRT_2),
            Difficulty::Hard => SearchSettings::new(1600, std::f64::consts::SQRT_2),
        }
    }
}
