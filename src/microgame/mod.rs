//! Microgames: five self-contained puzzles behind one contract.
//!
//! Each level builds a fresh puzzle from the run's RNG when it is activated.
//! The puzzle judges inputs; the surrounding [`MicrogameUnit`] adds the level
//! hint, transient "wrong" feedback and the [`CompletionLatch`] that makes the
//! completion signal one-shot. Wrong answers are plain [`Attempt::Incorrect`]
//! results: nothing is committed, so the player can retry forever.

use rand::Rng;

mod level1_color_match;
mod level2_arrow;
mod level3_sequence;
mod level4_odd_one;
mod level5_rapid_tap;

pub use level1_color_match::{ColorMatch, PALETTE};
pub use level2_arrow::{ArrowDirection, ArrowRule, ARROW_ROUNDS};
pub use level3_sequence::{SequenceRecall, PADS, SEQUENCE_LEN, SHOW_STEP_MS};
pub use level4_odd_one::{OddOneOut, LOOKALIKES, ODD_GRID_CELLS};
pub use level5_rapid_tap::{RapidTap, TAP_GOALS};

// --- Inputs / Results --------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Left => "←",
            Direction::Right => "→",
        }
    }

    /// Accepts plain names ("up") and DOM key names ("ArrowUp").
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("Arrow").unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// Pick the n-th on-screen choice (0-based).
    Choice(usize),
    Direction(Direction),
    Tap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Right answer, more to do.
    Progress,
    /// The puzzle is now solved.
    Solved,
    /// Wrong answer; retry allowed.
    Incorrect,
    /// Input does not apply right now (wrong kind, playback running, already solved).
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MicrogameKind {
    ColorMatch,
    ArrowDirection,
    SequenceRecall,
    OddOneOut,
    RapidTap,
}

impl MicrogameKind {
    pub const ORDER: [MicrogameKind; 5] = [
        MicrogameKind::ColorMatch,
        MicrogameKind::ArrowDirection,
        MicrogameKind::SequenceRecall,
        MicrogameKind::OddOneOut,
        MicrogameKind::RapidTap,
    ];

    /// Microgame played at a 1-based level. Out-of-range levels clamp to the ends.
    pub fn for_level(level: usize) -> Self {
        let idx = level.clamp(1, Self::ORDER.len()) - 1;
        Self::ORDER[idx]
    }

    pub fn title(self) -> &'static str {
        match self {
            MicrogameKind::ColorMatch => "Color Match",
            MicrogameKind::ArrowDirection => "Arrow Rush",
            MicrogameKind::SequenceRecall => "Sequence Recall",
            MicrogameKind::OddOneOut => "Odd One Out",
            MicrogameKind::RapidTap => "Rapid Tap",
        }
    }
}

/// What the shell needs to draw a puzzle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Prompt {
    pub instruction: String,
    /// Big central stimulus (a word, an arrow, a lit pad, a tap counter).
    pub cue: Option<String>,
    /// Labels for `Input::Choice(i)`, in order.
    pub choices: Vec<String>,
}

// --- Puzzle contract ---------------------------------------------------------

pub trait Puzzle {
    fn kind(&self) -> MicrogameKind;

    fn handle(&mut self, input: Input, now_ms: u64) -> Attempt;

    fn prompt(&self, now_ms: u64) -> Prompt;

    /// Input script that solves the puzzle from its current state.
    fn solution(&self) -> Vec<Input>;

    /// First instant inputs are judged (after any stimulus playback).
    fn ready_at_ms(&self) -> u64 {
        0
    }
}

/// Builds a fresh puzzle of `kind`. Pure apart from the RNG draws.
pub fn generate_puzzle<R: Rng + ?Sized>(
    kind: MicrogameKind,
    rng: &mut R,
    now_ms: u64,
) -> Box<dyn Puzzle> {
    log::trace!("generating {:?} at {now_ms}", kind);
    match kind {
        MicrogameKind::ColorMatch => Box::new(ColorMatch::generate(rng)),
        MicrogameKind::ArrowDirection => Box::new(ArrowDirection::generate(rng)),
        MicrogameKind::SequenceRecall => Box::new(SequenceRecall::generate(rng, now_ms)),
        MicrogameKind::OddOneOut => Box::new(OddOneOut::generate(rng)),
        MicrogameKind::RapidTap => Box::new(RapidTap::generate(rng)),
    }
}

// --- One-shot completion ---------------------------------------------------

/// Proof that the microgame of `level` was solved. Produced at most once per unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub level: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum LatchState {
    #[default]
    Armed,
    Solved,
    Fired,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionLatch {
    state: LatchState,
}

impl CompletionLatch {
    pub fn mark_solved(&mut self) {
        if self.state == LatchState::Armed {
            self.state = LatchState::Solved;
        }
    }

    pub fn is_solved(&self) -> bool {
        self.state != LatchState::Armed
    }

    pub fn has_fired(&self) -> bool {
        self.state == LatchState::Fired
    }

    /// True exactly once, on the first call after `mark_solved`.
    pub fn fire(&mut self) -> bool {
        if self.state == LatchState::Solved {
            self.state = LatchState::Fired;
            true
        } else {
            false
        }
    }
}

// --- Unit --------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Feedback {
    Correct,
    Incorrect,
}

/// Props handed down to the active microgame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MicrogameProps {
    pub level: usize,
    pub kind: MicrogameKind,
}

pub struct MicrogameUnit {
    level: usize,
    puzzle: Box<dyn Puzzle>,
    latch: CompletionLatch,
    incorrect_until_ms: Option<u64>,
    incorrect_feedback_ms: u64,
    misses: u32,
}

impl MicrogameUnit {
    /// Activates the microgame for `level`. The level is only a hint; difficulty does not scale.
    pub fn activate<R: Rng + ?Sized>(
        level: usize,
        rng: &mut R,
        now_ms: u64,
        incorrect_feedback_ms: u64,
    ) -> Self {
        let kind = MicrogameKind::for_level(level);
        Self::with_puzzle(level, generate_puzzle(kind, rng, now_ms), incorrect_feedback_ms)
    }

    pub fn with_puzzle(level: usize, puzzle: Box<dyn Puzzle>, incorrect_feedback_ms: u64) -> Self {
        Self {
            level,
            puzzle,
            latch: CompletionLatch::default(),
            incorrect_until_ms: None,
            incorrect_feedback_ms,
            misses: 0,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn kind(&self) -> MicrogameKind {
        self.puzzle.kind()
    }

    pub fn props(&self) -> MicrogameProps {
        MicrogameProps {
            level: self.level,
            kind: self.kind(),
        }
    }

    pub fn puzzle(&self) -> &dyn Puzzle {
        self.puzzle.as_ref()
    }

    pub fn prompt(&self, now_ms: u64) -> Prompt {
        self.puzzle.prompt(now_ms)
    }

    pub fn is_solved(&self) -> bool {
        self.latch.is_solved()
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn handle_input(&mut self, input: Input, now_ms: u64) -> Attempt {
        if self.latch.is_solved() {
            return Attempt::Ignored;
        }
        let attempt = self.puzzle.handle(input, now_ms);
        match attempt {
            Attempt::Solved => self.latch.mark_solved(),
            Attempt::Incorrect => {
                self.misses += 1;
                self.incorrect_until_ms = Some(now_ms.saturating_add(self.incorrect_feedback_ms));
            }
            Attempt::Progress => self.incorrect_until_ms = None,
            Attempt::Ignored => {}
        }
        attempt
    }

    /// The completion signal. Yields `Some` once, and only after the puzzle was solved.
    pub fn signal_completion(&mut self) -> Option<Completion> {
        self.latch.fire().then_some(Completion { level: self.level })
    }

    pub fn feedback(&self, now_ms: u64) -> Option<Feedback> {
        if self.latch.is_solved() {
            return Some(Feedback::Correct);
        }
        match self.incorrect_until_ms {
            Some(until) if now_ms < until => Some(Feedback::Incorrect),
            _ => None,
        }
    }
}
