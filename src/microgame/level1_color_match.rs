// Microgame 1: Color Match
// A color word is printed in a different ink; tap the swatch the word names.
use rand::Rng;
use rand::seq::SliceRandom;

use super::{Attempt, Input, MicrogameKind, Prompt, Puzzle};

pub static PALETTE: [(&str, &str); 6] = [
    ("Red", "#e74c3c"),
    ("Blue", "#3498db"),
    ("Green", "#2ecc71"),
    ("Yellow", "#f1c40f"),
    ("Purple", "#9b59b6"),
    ("Orange", "#e67e22"),
];

const SWATCHES: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMatch {
    /// Indices into `PALETTE`, in on-screen order.
    swatches: [usize; SWATCHES],
    /// Position in `swatches` of the named color.
    target: usize,
    /// Palette index used as ink for the word; never the named color.
    ink: usize,
}

impl ColorMatch {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut all: Vec<usize> = (0..PALETTE.len()).collect();
        all.shuffle(rng);
        let mut swatches = [0; SWATCHES];
        swatches.copy_from_slice(&all[..SWATCHES]);
        let target = rng.gen_range(0..SWATCHES);
        let named = swatches[target];
        let ink_choices: Vec<usize> = (0..PALETTE.len()).filter(|&c| c != named).collect();
        let ink = ink_choices[rng.gen_range(0..ink_choices.len())];
        Self {
            swatches,
            target,
            ink,
        }
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn target_name(&self) -> &'static str {
        PALETTE[self.swatches[self.target]].0
    }

    pub fn ink_hex(&self) -> &'static str {
        PALETTE[self.ink].1
    }
}

impl Puzzle for ColorMatch {
    fn kind(&self) -> MicrogameKind {
        MicrogameKind::ColorMatch
    }

    fn handle(&mut self, input: Input, _now_ms: u64) -> Attempt {
        match input {
            Input::Choice(i) if i == self.target => Attempt::Solved,
            Input::Choice(i) if i < SWATCHES => Attempt::Incorrect,
            _ => Attempt::Ignored,
        }
    }

    fn prompt(&self, _now_ms: u64) -> Prompt {
        Prompt {
            instruction: "Tap the color the word names, not its ink".to_string(),
            cue: Some(format!("{} ({})", self.target_name(), self.ink_hex())),
            choices: self
                .swatches
                .iter()
                .map(|&c| PALETTE[c].1.to_string())
                .collect(),
        }
    }

    fn solution(&self) -> Vec<Input> {
        vec![Input::Choice(self.target)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn swatches_are_distinct_and_ink_misleads() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let g = ColorMatch::generate(&mut rng);
            let mut seen = g.swatches.to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), SWATCHES);
            assert_ne!(g.ink, g.swatches[g.target]);
        }
    }

    #[test]
    fn wrong_swatch_is_recoverable() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut g = ColorMatch::generate(&mut rng);
        let wrong = (g.target_index() + 1) % SWATCHES;
        assert_eq!(g.handle(Input::Choice(wrong), 0), Attempt::Incorrect);
        assert_eq!(g.handle(Input::Tap, 0), Attempt::Ignored);
        assert_eq!(g.handle(Input::Choice(99), 0), Attempt::Ignored);
        assert_eq!(g.handle(Input::Choice(g.target_index()), 0), Attempt::Solved);
    }
}
