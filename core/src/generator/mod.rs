use crate::*;
pub use shuffle::*;

mod shuffle;

/// Produces a fresh board for a difficulty level.
pub trait BoardGenerator {
    fn deal(&mut self, difficulty: Difficulty) -> Result<Board>;
}

/// Default card faces, enough distinct symbols for the hardest difficulty.
pub const SYMBOL_POOL: [&str; 32] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵", "🐔",
    "🐧", "🐦", "🐤", "🦆", "🦅", "🦉", "🦇", "🐺", "🐗", "🐴", "🦄", "🐝", "🐛", "🦋", "🐌", "🐞",
];
