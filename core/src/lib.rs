#![no_std]

extern crate alloc;

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use card::*;
pub use error::*;
pub use generator::*;
pub use input::*;
pub use render::*;
pub use session::*;
pub use timer::*;
pub use types::*;

mod board;
mod card;
mod error;
mod generator;
mod input;
mod render;
mod session;
mod timer;
mod types;

#[cfg(test)]
mod testing;

/// Board sizes offered by the difficulty selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// `(rows, cols)` of the board dealt for this difficulty.
    pub const fn size(self) -> GridSize {
        match self {
            Self::Easy => (4, 4),
            Self::Medium => (6, 6),
            Self::Hard => (8, 8),
        }
    }

    pub const fn total_cards(self) -> CardCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub const fn pairs(self) -> CardCount {
        self.total_cards() / 2
    }

    /// Value used by the controls collaborator for this level.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy (4×4)",
            Self::Medium => "Medium (6×6)",
            Self::Hard => "Hard (8×8)",
        }
    }

    /// The largest board, which bounds the symbol pool size.
    pub const fn hardest() -> Self {
        Self::Hard
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.key().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of a flip request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Request was ignored: wrong phase, out of range, or card not face down.
    NoChange,
    /// First card of a pair turned face up.
    Flipped,
    /// Second card matched the first one.
    Matched,
    /// Second card did not match, both will turn back after a delay.
    Mismatched,
    /// Last pair matched and the game ended.
    Won,
}

impl FlipOutcome {
    pub const fn has_update(self) -> bool {
        use FlipOutcome::*;
        match self {
            NoChange => false,
            Flipped => true,
            Matched => true,
            Mismatched => true,
            Won => true,
        }
    }

    /// Whether the request completed a pair, counting as one attempt.
    pub const fn is_attempt(self) -> bool {
        matches!(self, Self::Matched | Self::Mismatched | Self::Won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_sizes_are_even_squares() {
        assert_eq!(Difficulty::Easy.size(), (4, 4));
        assert_eq!(Difficulty::Medium.size(), (6, 6));
        assert_eq!(Difficulty::Hard.size(), (8, 8));
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.total_cards() % 2, 0);
            assert_eq!(difficulty.pairs() * 2, difficulty.total_cards());
        }
    }

    #[test]
    fn difficulty_parses_selector_values() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!(" Medium ".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty)
        );
    }

    #[test]
    fn only_completed_pairs_count_as_attempts() {
        assert!(!FlipOutcome::NoChange.is_attempt());
        assert!(!FlipOutcome::Flipped.is_attempt());
        assert!(FlipOutcome::Matched.is_attempt());
        assert!(FlipOutcome::Mismatched.is_attempt());
        assert!(FlipOutcome::Won.is_attempt());
        assert!(!FlipOutcome::NoChange.has_update());
    }
}
