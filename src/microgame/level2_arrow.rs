// Microgame 2: Arrow Rush
// Three arrows in a row. Depending on the rule, press the way each one points or the opposite way.
use rand::Rng;

use super::{Attempt, Direction, Input, MicrogameKind, Prompt, Puzzle};

pub const ARROW_ROUNDS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowRule {
    Follow,
    Opposite,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrowDirection {
    rule: ArrowRule,
    arrows: [Direction; ARROW_ROUNDS],
    round: usize,
}

impl ArrowDirection {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rule = if rng.gen_bool(0.5) {
            ArrowRule::Follow
        } else {
            ArrowRule::Opposite
        };
        let arrows =
            std::array::from_fn(|_| Direction::ALL[rng.gen_range(0..Direction::ALL.len())]);
        Self {
            rule,
            arrows,
            round: 0,
        }
    }

    pub fn rule(&self) -> ArrowRule {
        self.rule
    }

    pub fn round(&self) -> usize {
        self.round
    }

    fn expected(&self, arrow: Direction) -> Direction {
        match self.rule {
            ArrowRule::Follow => arrow,
            ArrowRule::Opposite => arrow.opposite(),
        }
    }
}

impl Puzzle for ArrowDirection {
    fn kind(&self) -> MicrogameKind {
        MicrogameKind::ArrowDirection
    }

    fn handle(&mut self, input: Input, _now_ms: u64) -> Attempt {
        let Input::Direction(pressed) = input else {
            return Attempt::Ignored;
        };
        let Some(&arrow) = self.arrows.get(self.round) else {
            return Attempt::Ignored;
        };
        if pressed != self.expected(arrow) {
            return Attempt::Incorrect;
        }
        self.round += 1;
        if self.round == ARROW_ROUNDS {
            Attempt::Solved
        } else {
            Attempt::Progress
        }
    }

    fn prompt(&self, _now_ms: u64) -> Prompt {
        let instruction = match self.rule {
            ArrowRule::Follow => "Press the way the arrow points",
            ArrowRule::Opposite => "Press the OPPOSITE way",
        };
        Prompt {
            instruction: instruction.to_string(),
            cue: self.arrows.get(self.round).map(|a| {
                format!("{}  ({}/{})", a.arrow(), self.round + 1, ARROW_ROUNDS)
            }),
            choices: Vec::new(),
        }
    }

    fn solution(&self) -> Vec<Input> {
        self.arrows[self.round.min(ARROW_ROUNDS)..]
            .iter()
            .map(|&a| Input::Direction(self.expected(a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(rule: ArrowRule) -> ArrowDirection {
        ArrowDirection {
            rule,
            arrows: [Direction::Up, Direction::Left, Direction::Left],
            round: 0,
        }
    }

    #[test]
    fn follow_rule_walks_all_rounds() {
        let mut g = fixed(ArrowRule::Follow);
        assert_eq!(g.handle(Input::Direction(Direction::Up), 0), Attempt::Progress);
        assert_eq!(g.handle(Input::Direction(Direction::Left), 0), Attempt::Progress);
        assert_eq!(g.handle(Input::Direction(Direction::Left), 0), Attempt::Solved);
        assert_eq!(g.handle(Input::Direction(Direction::Left), 0), Attempt::Ignored);
    }

    #[test]
    fn wrong_press_keeps_the_current_arrow() {
        let mut g = fixed(ArrowRule::Opposite);
        assert_eq!(g.handle(Input::Direction(Direction::Up), 0), Attempt::Incorrect);
        assert_eq!(g.round(), 0);
        assert_eq!(g.handle(Input::Direction(Direction::Down), 0), Attempt::Progress);
        assert_eq!(g.solution(), vec![Input::Direction(Direction::Right); 2]);
    }
}
