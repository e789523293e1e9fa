//! Runtime tuning for a run. Defaults are the shipped game rules.

/// Number of microgames in one run.
pub const LEVEL_COUNT: usize = 5;

/// Time added to the clock for every skipped level.
pub const SKIP_PENALTY_MS: u64 = 30_000;

/// How long a level must be on screen before the skip button shows up.
pub const SKIP_REVEAL_DELAY_MS: u64 = 5_000;

/// Pause between a solving input and the completion signal, so the player sees the hit.
pub const COMPLETION_DELAY_MS: u64 = 400;

/// How long the "wrong" flash stays up after an incorrect attempt.
pub const INCORRECT_FEEDBACK_MS: u64 = 500;

/// Refresh cadence of the on-screen clock.
pub const TIMER_REFRESH_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct GameConfig {
    pub skip_penalty_ms: u64,
    pub skip_reveal_delay_ms: u64,
    pub completion_delay_ms: u64,
    pub incorrect_feedback_ms: u64,
    pub timer_refresh_ms: u64,
    /// Fixed RNG seed for reproducible puzzles; `None` draws from OS / browser entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            skip_penalty_ms: SKIP_PENALTY_MS,
            skip_reveal_delay_ms: SKIP_REVEAL_DELAY_MS,
            completion_delay_ms: COMPLETION_DELAY_MS,
            incorrect_feedback_ms: INCORRECT_FEEDBACK_MS,
            timer_refresh_ms: TIMER_REFRESH_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
