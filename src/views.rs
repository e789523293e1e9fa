//! Read-only projections of the session: clock, progress row, skip button, results.
//!
//! None of these hold session state. They are rebuilt from props the container
//! hands out, and talk back only through the container's public actions.

use std::fmt;

use crate::config::LEVEL_COUNT;
use crate::microgame::MicrogameKind;
use crate::session::LevelOutcome;

// --- Timer display -------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TimerProps {
    pub origin_ms: Option<u64>,
    pub penalty_ms: u64,
}

/// `MM:SS.hh`, zero padded. Minutes keep counting past 59.
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let hundredths = (ms % 1_000) / 10;
    format!("{minutes:02}:{seconds:02}.{hundredths:02}")
}

/// On-screen run clock. Samples `now` at most once per refresh period.
#[derive(Clone, Debug)]
pub struct TimerDisplay {
    props: TimerProps,
    refresh_ms: u64,
    shown_ms: u64,
    last_refresh_ms: Option<u64>,
}

impl TimerDisplay {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            props: TimerProps::default(),
            refresh_ms: refresh_ms.max(1),
            shown_ms: 0,
            last_refresh_ms: None,
        }
    }

    pub fn props(&self) -> TimerProps {
        self.props
    }

    /// New props force a refresh on the next tick.
    pub fn set_props(&mut self, props: TimerProps) {
        if props != self.props {
            self.props = props;
            self.last_refresh_ms = None;
        }
    }

    /// Returns true when the shown value was recomputed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(origin) = self.props.origin_ms else {
            let changed = self.shown_ms != 0;
            self.shown_ms = 0;
            self.last_refresh_ms = None;
            return changed;
        };
        let due = self
            .last_refresh_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.refresh_ms);
        if !due {
            return false;
        }
        self.shown_ms = now_ms
            .saturating_sub(origin)
            .saturating_add(self.props.penalty_ms);
        self.last_refresh_ms = Some(now_ms);
        true
    }

    pub fn shown_ms(&self) -> u64 {
        self.shown_ms
    }

    pub fn text(&self) -> String {
        format_clock(self.shown_ms)
    }
}

// --- Progress indicator ---------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum LevelStatus {
    Completed,
    Skipped,
    Current,
    Upcoming,
}

impl LevelStatus {
    fn from_outcome(outcome: &LevelOutcome) -> Option<Self> {
        if outcome.completed {
            Some(LevelStatus::Completed)
        } else if outcome.skipped {
            Some(LevelStatus::Skipped)
        } else {
            None
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            LevelStatus::Completed => "✓",
            LevelStatus::Skipped => "↷",
            LevelStatus::Current => "●",
            LevelStatus::Upcoming => "○",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LevelStatus::Completed => "done",
            LevelStatus::Skipped => "skipped",
            LevelStatus::Current => "playing",
            LevelStatus::Upcoming => "-",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressProps {
    pub current_level: usize,
    pub outcomes: [LevelOutcome; LEVEL_COUNT],
}

pub fn progress_statuses(props: &ProgressProps) -> [LevelStatus; LEVEL_COUNT] {
    std::array::from_fn(|idx| {
        let level = idx + 1;
        let recorded = LevelStatus::from_outcome(&props.outcomes[idx]);
        match level.cmp(&props.current_level) {
            std::cmp::Ordering::Less => recorded.unwrap_or(LevelStatus::Upcoming),
            // A finished run leaves the index on the last level, which by then has an outcome.
            std::cmp::Ordering::Equal => recorded.unwrap_or(LevelStatus::Current),
            std::cmp::Ordering::Greater => LevelStatus::Upcoming,
        }
    })
}

pub fn progress_row(props: &ProgressProps) -> String {
    progress_statuses(props)
        .iter()
        .map(|s| s.glyph())
        .collect::<Vec<_>>()
        .join(" ")
}

// --- Skip control ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SkipProps {
    pub visible: bool,
    pub penalty_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipRequest;

/// Stateless: no debouncing here, the container refuses skips it cannot take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipControl {
    props: SkipProps,
}

impl SkipControl {
    pub fn new(props: SkipProps) -> Self {
        Self { props }
    }

    /// Button text, or `None` when nothing should be drawn.
    pub fn label(&self) -> Option<String> {
        self.props
            .visible
            .then(|| format!("Skip (+{}s)", self.props.penalty_ms / 1_000))
    }

    /// One press, one request.
    pub fn press(&self) -> Option<SkipRequest> {
        self.props.visible.then_some(SkipRequest)
    }
}

// --- Results view ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultsProps {
    pub final_elapsed_ms: u64,
    pub outcomes: [LevelOutcome; LEVEL_COUNT],
    pub penalty_per_skip_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResultRow {
    pub level: usize,
    pub title: &'static str,
    pub status: LevelStatus,
    /// Run clock when the level was left.
    pub split_ms: u64,
    /// Time spent on this level alone.
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResultsSummary {
    pub final_elapsed_ms: u64,
    pub completed: usize,
    pub skipped: usize,
    pub total_penalty_ms: u64,
    pub rows: Vec<ResultRow>,
}

impl ResultsSummary {
    pub fn from_props(props: &ResultsProps) -> Self {
        let completed = props.outcomes.iter().filter(|o| o.completed).count();
        let skipped = props.outcomes.iter().filter(|o| o.skipped).count();
        let mut prev_split = 0;
        let rows = props
            .outcomes
            .iter()
            .enumerate()
            .map(|(idx, outcome)| {
                let status = LevelStatus::from_outcome(outcome).unwrap_or(LevelStatus::Upcoming);
                let duration_ms = if outcome.is_recorded() {
                    let d = outcome.time_spent_ms.saturating_sub(prev_split);
                    prev_split = outcome.time_spent_ms;
                    d
                } else {
                    0
                };
                ResultRow {
                    level: idx + 1,
                    title: MicrogameKind::for_level(idx + 1).title(),
                    status,
                    split_ms: outcome.time_spent_ms,
                    duration_ms,
                }
            })
            .collect();
        Self {
            final_elapsed_ms: props.final_elapsed_ms,
            completed,
            skipped,
            total_penalty_ms: skipped as u64 * props.penalty_per_skip_ms,
            rows,
        }
    }
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final time  {}", format_clock(self.final_elapsed_ms))?;
        writeln!(f, "Completed   {}/{}", self.completed, self.rows.len())?;
        writeln!(
            f,
            "Skipped     {} (+{})",
            self.skipped,
            format_clock(self.total_penalty_ms)
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>2} {:<16} {:<8} {}  (+{})",
                row.level,
                row.title,
                row.status.label(),
                format_clock(row.split_ms),
                format_clock(row.duration_ms)
            )?;
        }
        Ok(())
    }
}
