//! The authoritative record of one playthrough and the reducer that moves it.
//!
//! Nothing outside [`GameSession::reduce`] mutates a session. The reducer checks
//! every precondition before it writes, so a refused [`Action`] leaves the
//! record exactly as it was. Side effects (timers, microgame activation) are
//! the container's job and are driven off the returned [`Transition`].

use std::fmt;

use crate::config::{GameConfig, LEVEL_COUNT};
use crate::error::GameError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Completed => "completed",
        })
    }
}

/// Result of one level. `time_spent_ms` is the run clock (without penalties) at
/// the moment the level was left, so consecutive entries form cumulative splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LevelOutcome {
    pub completed: bool,
    pub skipped: bool,
    pub time_spent_ms: u64,
}

impl LevelOutcome {
    pub fn completed(time_spent_ms: u64) -> Self {
        Self {
            completed: true,
            skipped: false,
            time_spent_ms,
        }
    }

    pub fn skipped(time_spent_ms: u64) -> Self {
        Self {
            completed: false,
            skipped: true,
            time_spent_ms,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.completed || self.skipped
    }
}

/// Inputs to the reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Start,
    /// Completion signal from the microgame of `level` (1-based).
    CompleteLevel { level: usize },
    Skip,
    /// The skip-reveal timer scheduled for `level` fired.
    RevealSkip { level: usize },
    Restart,
}

/// What an accepted action did; the container maps these onto side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Started { level: usize },
    Advanced { from: usize, to: usize },
    Finished { final_elapsed_ms: u64 },
    SkipRevealed { level: usize },
    Reset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GameSession {
    phase: Phase,
    current_level: usize,
    started_at_ms: Option<u64>,
    penalty_ms: u64,
    final_elapsed_ms: Option<u64>,
    outcomes: [LevelOutcome; LEVEL_COUNT],
    skip_visible: bool,
    revision: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_level: 1,
            started_at_ms: None,
            penalty_ms: 0,
            final_elapsed_ms: None,
            outcomes: [LevelOutcome::default(); LEVEL_COUNT],
            skip_visible: false,
            revision: 0,
        }
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 1-based index of the level being played. Only meaningful while playing.
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn penalty_ms(&self) -> u64 {
        self.penalty_ms
    }

    pub fn final_elapsed_ms(&self) -> Option<u64> {
        self.final_elapsed_ms
    }

    pub fn outcomes(&self) -> &[LevelOutcome; LEVEL_COUNT] {
        &self.outcomes
    }

    pub fn skip_visible(&self) -> bool {
        self.skip_visible
    }

    /// Bumped once per accepted transition, never reset.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wall time since the run started, without penalties. An unset origin reads as zero.
    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        self.started_at_ms
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0)
    }

    pub fn reduce(
        &mut self,
        action: Action,
        now_ms: u64,
        config: &GameConfig,
    ) -> Result<Transition, GameError> {
        let transition = match action {
            Action::Start => {
                self.expect_phase(Phase::Idle, "start")?;
                *self = Self {
                    phase: Phase::Playing,
                    started_at_ms: Some(now_ms),
                    revision: self.revision,
                    ..Self::default()
                };
                Transition::Started { level: 1 }
            }
            Action::CompleteLevel { level } => {
                self.expect_phase(Phase::Playing, "complete a level")?;
                if level != self.current_level {
                    return Err(GameError::StaleCompletion {
                        level,
                        current: self.current_level,
                    });
                }
                self.record(LevelOutcome::completed(self.elapsed_at(now_ms)))?;
                self.advance(now_ms)
            }
            Action::Skip => {
                self.expect_phase(Phase::Playing, "skip")?;
                if !self.skip_visible {
                    return Err(GameError::SkipUnavailable {
                        level: self.current_level,
                    });
                }
                self.record(LevelOutcome::skipped(self.elapsed_at(now_ms)))?;
                self.penalty_ms = self.penalty_ms.saturating_add(config.skip_penalty_ms);
                self.advance(now_ms)
            }
            Action::RevealSkip { level } => {
                self.expect_phase(Phase::Playing, "reveal skip")?;
                if level != self.current_level {
                    return Err(GameError::StaleReveal {
                        level,
                        current: self.current_level,
                    });
                }
                self.skip_visible = true;
                Transition::SkipRevealed { level }
            }
            Action::Restart => {
                if self.phase == Phase::Idle {
                    return Err(GameError::WrongPhase {
                        action: "restart",
                        phase: self.phase,
                    });
                }
                *self = Self {
                    revision: self.revision,
                    ..Self::default()
                };
                Transition::Reset
            }
        };
        self.revision += 1;
        Ok(transition)
    }

    fn expect_phase(&self, required: Phase, action: &'static str) -> Result<(), GameError> {
        if self.phase == required {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn record(&mut self, outcome: LevelOutcome) -> Result<(), GameError> {
        let level = self.current_level;
        let slot = &mut self.outcomes[level - 1];
        if slot.is_recorded() {
            return Err(GameError::OutcomeAlreadyRecorded { level });
        }
        *slot = outcome;
        Ok(())
    }

    fn advance(&mut self, now_ms: u64) -> Transition {
        self.skip_visible = false;
        let from = self.current_level;
        if from >= LEVEL_COUNT {
            let final_elapsed_ms = self.elapsed_at(now_ms).saturating_add(self.penalty_ms);
            self.final_elapsed_ms = Some(final_elapsed_ms);
            self.phase = Phase::Completed;
            Transition::Finished { final_elapsed_ms }
        } else {
            self.current_level = from + 1;
            Transition::Advanced { from, to: from + 1 }
        }
    }
}
