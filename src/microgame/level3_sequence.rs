// Microgame 3: Sequence Recall
// Pads light up one after another; repeat the order. A slip restarts entry from the first pad.
use rand::Rng;

use super::{Attempt, Input, MicrogameKind, Prompt, Puzzle};

pub static PADS: [&str; 4] = ["🟥", "🟦", "🟩", "🟨"];
pub const SEQUENCE_LEN: usize = 4;
/// How long each pad stays lit during playback.
pub const SHOW_STEP_MS: u64 = 600;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecall {
    sequence: [usize; SEQUENCE_LEN],
    shown_from_ms: u64,
    entered: usize,
}

impl SequenceRecall {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, now_ms: u64) -> Self {
        Self {
            sequence: std::array::from_fn(|_| rng.gen_range(0..PADS.len())),
            shown_from_ms: now_ms,
            entered: 0,
        }
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn entered(&self) -> usize {
        self.entered
    }

    pub fn playback_ends_at(&self) -> u64 {
        self.shown_from_ms + SHOW_STEP_MS * SEQUENCE_LEN as u64
    }

    /// Pad lit at `now_ms` during playback.
    fn lit_pad(&self, now_ms: u64) -> Option<usize> {
        if now_ms < self.shown_from_ms || now_ms >= self.playback_ends_at() {
            return None;
        }
        let step = ((now_ms - self.shown_from_ms) / SHOW_STEP_MS) as usize;
        self.sequence.get(step).copied()
    }
}

impl Puzzle for SequenceRecall {
    fn kind(&self) -> MicrogameKind {
        MicrogameKind::SequenceRecall
    }

    fn handle(&mut self, input: Input, now_ms: u64) -> Attempt {
        if now_ms < self.playback_ends_at() {
            return Attempt::Ignored;
        }
        let Input::Choice(pad) = input else {
            return Attempt::Ignored;
        };
        if pad >= PADS.len() || self.entered >= SEQUENCE_LEN {
            return Attempt::Ignored;
        }
        if pad != self.sequence[self.entered] {
            self.entered = 0;
            return Attempt::Incorrect;
        }
        self.entered += 1;
        if self.entered == SEQUENCE_LEN {
            Attempt::Solved
        } else {
            Attempt::Progress
        }
    }

    fn prompt(&self, now_ms: u64) -> Prompt {
        let (instruction, cue) = if now_ms < self.playback_ends_at() {
            (
                "Watch the pads",
                self.lit_pad(now_ms).map(|p| PADS[p].to_string()),
            )
        } else {
            (
                "Repeat the sequence",
                Some(format!("{}/{}", self.entered, SEQUENCE_LEN)),
            )
        };
        Prompt {
            instruction: instruction.to_string(),
            cue,
            choices: PADS.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn solution(&self) -> Vec<Input> {
        self.sequence[self.entered.min(SEQUENCE_LEN)..]
            .iter()
            .map(|&p| Input::Choice(p))
            .collect()
    }

    fn ready_at_ms(&self) -> u64 {
        self.playback_ends_at()
    }
}
