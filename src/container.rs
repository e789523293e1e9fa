//! The game container: owns the session, the timers and the active microgame.
//!
//! Every public action runs to completion: reduce the session, then apply the
//! transition's side effects (cancel stale timers, activate the next
//! microgame, schedule the next skip reveal) before returning. Because timers
//! are cancelled inside the same call that leaves their level, a reveal or a
//! completion delivery can never fire into a level that is already gone.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::microgame::{Attempt, Completion, Feedback, Input, MicrogameProps, MicrogameUnit, Prompt};
use crate::schedule::{Scheduler, TimerId};
use crate::session::{Action, GameSession, Phase, Transition};
use crate::views::{
    LevelStatus, ProgressProps, ResultsProps, ResultsSummary, SkipControl, SkipProps, TimerDisplay,
    TimerProps, progress_row, progress_statuses,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheduled {
    RevealSkip { level: usize },
    DeliverCompletion { level: usize },
}

pub struct GameContainer {
    config: GameConfig,
    session: GameSession,
    scheduler: Scheduler<Scheduled>,
    skip_timer: Option<TimerId>,
    completion_timer: Option<TimerId>,
    active: Option<MicrogameUnit>,
    timer_display: TimerDisplay,
    rng: SmallRng,
}

impl GameContainer {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            timer_display: TimerDisplay::new(config.timer_refresh_ms),
            config,
            session: GameSession::new(),
            scheduler: Scheduler::new(),
            skip_timer: None,
            completion_timer: None,
            active: None,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn active_microgame(&self) -> Option<&MicrogameUnit> {
        self.active.as_ref()
    }

    pub fn timer_display(&self) -> &TimerDisplay {
        &self.timer_display
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn start(&mut self, now_ms: u64) -> Result<Transition, GameError> {
        self.dispatch(Action::Start, now_ms)
    }

    pub fn skip(&mut self, now_ms: u64) -> Result<Transition, GameError> {
        self.dispatch(Action::Skip, now_ms)
    }

    pub fn restart(&mut self, now_ms: u64) -> Result<Transition, GameError> {
        self.dispatch(Action::Restart, now_ms)
    }

    /// Feeds a microgame's completion signal into the session.
    pub fn complete_level(
        &mut self,
        completion: Completion,
        now_ms: u64,
    ) -> Result<Transition, GameError> {
        self.dispatch(
            Action::CompleteLevel {
                level: completion.level,
            },
            now_ms,
        )
    }

    /// Routes a player input to the active microgame. A solving input schedules
    /// the completion signal after the feedback pause.
    pub fn send_input(&mut self, input: Input, now_ms: u64) -> Result<Attempt, GameError> {
        if self.session.phase() != Phase::Playing {
            return Err(GameError::WrongPhase {
                action: "send input",
                phase: self.session.phase(),
            });
        }
        let unit = self.active.as_mut().ok_or(GameError::NoActiveMicrogame)?;
        let attempt = unit.handle_input(input, now_ms);
        if attempt == Attempt::Solved {
            let level = unit.level();
            log::debug!(
                "level {level} solved at {now_ms}, completion in {}ms",
                self.config.completion_delay_ms
            );
            let due = now_ms.saturating_add(self.config.completion_delay_ms);
            self.completion_timer = Some(
                self.scheduler
                    .schedule(due, Scheduled::DeliverCompletion { level }),
            );
        }
        Ok(attempt)
    }

    /// Fires every timer due at `now_ms` and refreshes the clock. Returns the
    /// transitions the fired timers caused, in order.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Transition> {
        let mut transitions = Vec::new();
        while let Some((id, event)) = self.scheduler.pop_due(now_ms) {
            let result = match event {
                Scheduled::RevealSkip { level } => {
                    if self.skip_timer == Some(id) {
                        self.skip_timer = None;
                    }
                    self.dispatch(Action::RevealSkip { level }, now_ms)
                }
                Scheduled::DeliverCompletion { level } => {
                    if self.completion_timer == Some(id) {
                        self.completion_timer = None;
                    }
                    let completion = self
                        .active
                        .as_mut()
                        .filter(|unit| unit.level() == level)
                        .and_then(MicrogameUnit::signal_completion);
                    match completion {
                        Some(completion) => self.complete_level(completion, now_ms),
                        None => Err(GameError::NoActiveMicrogame),
                    }
                }
            };
            match result {
                Ok(t) => transitions.push(t),
                Err(err) => log::debug!("dropped timer {:?}: {err}", event),
            }
        }
        self.timer_display.tick(now_ms);
        transitions
    }

    /// Cancels everything pending. Call when the game is unmounted.
    pub fn teardown(&mut self) {
        log::info!("teardown with {} pending timers", self.scheduler.len());
        self.clear_level();
    }

    fn dispatch(&mut self, action: Action, now_ms: u64) -> Result<Transition, GameError> {
        let transition = self
            .session
            .reduce(action, now_ms, &self.config)
            .inspect_err(|err| log::debug!("{:?} refused: {err}", action))?;
        log::info!(
            "{:?} -> {:?} (rev {})",
            action,
            transition,
            self.session.revision()
        );
        self.apply_effects(transition, now_ms);
        Ok(transition)
    }

    fn apply_effects(&mut self, transition: Transition, now_ms: u64) {
        match transition {
            Transition::Started { level } | Transition::Advanced { to: level, .. } => {
                self.cancel_level_timers();
                self.enter_level(level, now_ms);
            }
            Transition::Finished { .. } | Transition::Reset => self.clear_level(),
            Transition::SkipRevealed { .. } => {}
        }
        self.timer_display.set_props(self.timer_props());
    }

    fn enter_level(&mut self, level: usize, now_ms: u64) {
        self.active = Some(MicrogameUnit::activate(
            level,
            &mut self.rng,
            now_ms,
            self.config.incorrect_feedback_ms,
        ));
        let due = now_ms.saturating_add(self.config.skip_reveal_delay_ms);
        self.skip_timer = Some(self.scheduler.schedule(due, Scheduled::RevealSkip { level }));
    }

    fn cancel_level_timers(&mut self) {
        for id in [self.skip_timer.take(), self.completion_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(id);
        }
    }

    fn clear_level(&mut self) {
        self.scheduler.cancel_all();
        self.skip_timer = None;
        self.completion_timer = None;
        self.active = None;
    }

    // --- Props for the views ---------------------------------------------------

    pub fn timer_props(&self) -> TimerProps {
        TimerProps {
            origin_ms: match self.session.phase() {
                Phase::Playing => self.session.started_at_ms(),
                _ => None,
            },
            penalty_ms: self.session.penalty_ms(),
        }
    }

    pub fn progress_props(&self) -> ProgressProps {
        ProgressProps {
            current_level: self.session.current_level(),
            outcomes: *self.session.outcomes(),
        }
    }

    pub fn skip_props(&self) -> SkipProps {
        SkipProps {
            visible: self.session.phase() == Phase::Playing && self.session.skip_visible(),
            penalty_ms: self.config.skip_penalty_ms,
        }
    }

    pub fn microgame_props(&self) -> Option<MicrogameProps> {
        self.active.as_ref().map(MicrogameUnit::props)
    }

    /// Only available once the run is completed.
    pub fn results_props(&self) -> Option<ResultsProps> {
        let final_elapsed_ms = self.session.final_elapsed_ms()?;
        Some(ResultsProps {
            final_elapsed_ms,
            outcomes: *self.session.outcomes(),
            penalty_per_skip_ms: self.config.skip_penalty_ms,
        })
    }

    pub fn snapshot(&self, now_ms: u64) -> Snapshot {
        Snapshot {
            phase: self.session.phase(),
            revision: self.session.revision(),
            current_level: self.session.current_level(),
            clock: self.timer_display.text(),
            progress: progress_statuses(&self.progress_props()),
            progress_row: progress_row(&self.progress_props()),
            skip_label: SkipControl::new(self.skip_props()).label(),
            microgame: self.microgame_props(),
            prompt: self.active.as_ref().map(|u| u.prompt(now_ms)),
            feedback: self.active.as_ref().and_then(|u| u.feedback(now_ms)),
            misses: self.active.as_ref().map_or(0, MicrogameUnit::misses),
            results: self
                .results_props()
                .map(|props| ResultsSummary::from_props(&props)),
        }
    }
}

/// Everything the shell draws in one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    pub phase: Phase,
    pub revision: u64,
    pub current_level: usize,
    pub clock: String,
    pub progress: [LevelStatus; crate::config::LEVEL_COUNT],
    pub progress_row: String,
    pub skip_label: Option<String>,
    pub microgame: Option<MicrogameProps>,
    pub prompt: Option<Prompt>,
    pub feedback: Option<Feedback>,
    /// Wrong answers on the current level.
    pub misses: u32,
    pub results: Option<ResultsSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microgame::MicrogameKind;

    fn container() -> GameContainer {
        GameContainer::new(GameConfig::seeded(11))
    }

    fn solve_current(c: &mut GameContainer, now: u64) -> u64 {
        let unit = c.active_microgame().expect("active microgame");
        let at = now.max(unit.puzzle().ready_at_ms());
        for input in unit.puzzle().solution() {
            c.send_input(input, at).unwrap();
        }
        at
    }

    #[test]
    fn start_activates_level_one_and_arms_reveal() {
        let mut c = container();
        c.start(0).unwrap();
        assert_eq!(
            c.microgame_props(),
            Some(MicrogameProps {
                level: 1,
                kind: MicrogameKind::ColorMatch
            })
        );
        assert_eq!(c.pending_timers(), 1);
        assert!(!c.skip_props().visible);
        c.tick(4_999);
        assert!(!c.skip_props().visible);
        assert_eq!(c.tick(5_000), vec![Transition::SkipRevealed { level: 1 }]);
        assert!(c.skip_props().visible);
    }

    #[test]
    fn completion_is_delivered_after_feedback_pause() {
        let mut c = container();
        c.start(0).unwrap();
        let at = solve_current(&mut c, 1_000);
        assert!(c.tick(at + 399).is_empty());
        assert_eq!(c.session().current_level(), 1);
        assert_eq!(
            c.tick(at + 400),
            vec![Transition::Advanced { from: 1, to: 2 }]
        );
        assert_eq!(c.session().outcomes()[0].time_spent_ms, at + 400);
        // Level 1's reveal was cancelled with the advance; only level 2's remains.
        assert_eq!(c.pending_timers(), 1);
        c.tick(5_000);
        assert!(!c.skip_props().visible);
        c.tick(at + 400 + 5_000);
        assert!(c.skip_props().visible);
    }

    #[test]
    fn skip_cancels_pending_completion() {
        let mut c = container();
        c.start(0).unwrap();
        c.tick(5_000);
        solve_current(&mut c, 5_100);
        c.skip(5_200).unwrap();
        assert_eq!(c.session().current_level(), 2);
        assert!(c.tick(6_000).is_empty());
        assert_eq!(c.session().current_level(), 2);
        assert!(c.session().outcomes()[0].skipped);
    }

    #[test]
    fn input_outside_play_is_refused() {
        let mut c = container();
        assert_eq!(
            c.send_input(Input::Tap, 0).unwrap_err(),
            GameError::WrongPhase {
                action: "send input",
                phase: Phase::Idle
            }
        );
    }

    #[test]
    fn teardown_leaves_nothing_pending() {
        let mut c = container();
        c.start(0).unwrap();
        solve_current(&mut c, 100);
        c.teardown();
        assert_eq!(c.pending_timers(), 0);
        assert!(c.tick(60_000).is_empty());
        assert_eq!(c.session().current_level(), 1);
    }

    #[test]
    fn snapshot_tracks_phase() {
        let mut c = container();
        assert_eq!(c.snapshot(0).phase, Phase::Idle);
        c.start(0).unwrap();
        c.tick(1_234);
        let snap = c.snapshot(1_234);
        assert_eq!(snap.clock, "00:01.23");
        assert_eq!(snap.progress[0], LevelStatus::Current);
        assert!(snap.prompt.is_some());
        assert!(snap.results.is_none());
        assert_eq!(snap.progress_row, "● ○ ○ ○ ○");
    }

    #[test]
    fn snapshot_counts_one_miss_per_wrong_answer() {
        let mut c = container();
        c.start(0).unwrap();
        let Some(Input::Choice(target)) = c.active_microgame().unwrap().puzzle().solution().pop()
        else {
            panic!("color match is solved by a single choice");
        };
        let wrong = (target + 1) % 4;
        assert_eq!(c.send_input(Input::Choice(wrong), 100), Ok(Attempt::Incorrect));
        assert_eq!(c.snapshot(100).misses, 1);
        assert_eq!(c.send_input(Input::Choice(target), 200), Ok(Attempt::Solved));
        assert_eq!(c.snapshot(200).misses, 1);
    }
}
