// Microgame 4: Odd One Out
// A grid of one glyph hides a single look-alike; tap it.
use rand::Rng;

use super::{Attempt, Input, MicrogameKind, Prompt, Puzzle};

/// (common glyph, odd glyph)
pub static LOOKALIKES: [(&str, &str); 6] = [
    ("O", "Q"),
    ("E", "F"),
    ("b", "d"),
    ("6", "9"),
    ("M", "N"),
    ("🍎", "🍅"),
];

pub const ODD_GRID_CELLS: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OddOneOut {
    pair: usize,
    odd_cell: usize,
}

impl OddOneOut {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pair: rng.gen_range(0..LOOKALIKES.len()),
            odd_cell: rng.gen_range(0..ODD_GRID_CELLS),
        }
    }

    pub fn odd_cell(&self) -> usize {
        self.odd_cell
    }

    pub fn glyphs(&self) -> (&'static str, &'static str) {
        LOOKALIKES[self.pair]
    }
}

impl Puzzle for OddOneOut {
    fn kind(&self) -> MicrogameKind {
        MicrogameKind::OddOneOut
    }

    fn handle(&mut self, input: Input, _now_ms: u64) -> Attempt {
        match input {
            Input::Choice(i) if i == self.odd_cell => Attempt::Solved,
            Input::Choice(i) if i < ODD_GRID_CELLS => Attempt::Incorrect,
            _ => Attempt::Ignored,
        }
    }

    fn prompt(&self, _now_ms: u64) -> Prompt {
        let (common, odd) = self.glyphs();
        Prompt {
            instruction: "Find the one that doesn't belong".to_string(),
            cue: None,
            choices: (0..ODD_GRID_CELLS)
                .map(|i| (if i == self.odd_cell { odd } else { common }).to_string())
                .collect(),
        }
    }

    fn solution(&self) -> Vec<Input> {
        vec![Input::Choice(self.odd_cell)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn grid_has_exactly_one_odd_glyph() {
        let mut rng = SmallRng::seed_from_u64(3);
        let g = OddOneOut::generate(&mut rng);
        let (common, odd) = g.glyphs();
        let p = g.prompt(0);
        assert_eq!(p.choices.len(), ODD_GRID_CELLS);
        assert_eq!(p.choices.iter().filter(|c| c.as_str() == odd).count(), 1);
        assert_eq!(p.choices.iter().filter(|c| c.as_str() == common).count(), ODD_GRID_CELLS - 1);
        assert_eq!(p.choices[g.odd_cell()], odd);
    }

    #[test]
    fn same_seed_same_grid() {
        let a = OddOneOut::generate(&mut SmallRng::seed_from_u64(99));
        let b = OddOneOut::generate(&mut SmallRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
