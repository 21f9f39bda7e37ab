use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Symbol pool too small, {needed} pairs needed but only {available} symbols")]
    SymbolPoolTooSmall { needed: usize, available: usize },
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unknown difficulty")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;
