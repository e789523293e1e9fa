// Microgame 5: Rapid Tap
use rand::Rng;

use super::{Attempt, Input, MicrogameKind, Prompt, Puzzle};

pub static TAP_GOALS: [u32; 3] = [15, 20, 25];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RapidTap {
    goal: u32,
    taps: u32,
}

impl RapidTap {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            goal: TAP_GOALS[rng.gen_range(0..TAP_GOALS.len())],
            taps: 0,
        }
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn taps(&self) -> u32 {
        self.taps
    }
}

impl Puzzle for RapidTap {
    fn kind(&self) -> MicrogameKind {
        MicrogameKind::RapidTap
    }

    fn handle(&mut self, input: Input, _now_ms: u64) -> Attempt {
        if input != Input::Tap || self.taps >= self.goal {
            return Attempt::Ignored;
        }
        self.taps += 1;
        if self.taps == self.goal {
            Attempt::Solved
        } else {
            Attempt::Progress
        }
    }

    fn prompt(&self, _now_ms: u64) -> Prompt {
        Prompt {
            instruction: format!("Tap {} times as fast as you can", self.goal),
            cue: Some(format!("{}/{}", self.taps, self.goal)),
            choices: vec!["TAP".to_string()],
        }
    }

    fn solution(&self) -> Vec<Input> {
        vec![Input::Tap; self.goal.saturating_sub(self.taps) as usize]
    }
}
