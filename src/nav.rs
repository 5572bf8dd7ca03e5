use crate::data::Round;
use crate::render::round_label;

/// Current-round cursor. Always inside `[0, round_count - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    current: usize,
    round_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    pub index: usize,
    pub active: bool,
}

impl Navigator {
    pub fn new(round_count: usize) -> Self {
        Self {
            current: 0,
            round_count,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn round_count(&self) -> usize {
        self.round_count
    }

    /// Clamps any target, including negative ones, into range.
    pub fn go_to(&mut self, target: i64) -> usize {
        let last = self.round_count.saturating_sub(1) as i64;
        self.current = target.clamp(0, last) as usize;
        self.current
    }

    /// Keeps the cursor when it still fits, else pins it to the last round.
    pub fn set_round_count(&mut self, round_count: usize) {
        self.round_count = round_count;
        self.current = self.current.min(round_count.saturating_sub(1));
    }

    pub fn chips(&self, rounds: &[Round]) -> Vec<Chip> {
        rounds
            .iter()
            .enumerate()
            .map(|(index, round)| Chip {
                index,
                label: round_label(round, index),
                active: index == self.current,
            })
            .collect()
    }

    pub fn dots(&self) -> Vec<Dot> {
        (0..self.round_count)
            .map(|index| Dot {
                index,
                active: index == self.current,
            })
            .collect()
    }
}
