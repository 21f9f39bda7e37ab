use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Contents of the time slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDisplay {
    /// Seconds left in the preview.
    Countdown(u8),
    /// Elapsed play time, already formatted as `MM:SS`.
    Elapsed(String),
}

impl TimeDisplay {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Countdown(_) => "Countdown",
            Self::Elapsed(_) => "Time",
        }
    }
}

impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Countdown(secs) => write!(f, "{secs}"),
            Self::Elapsed(text) => f.write_str(text),
        }
    }
}

/// Final stats frozen when the last pair is matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub attempts: u32,
    pub elapsed_secs: u32,
    pub time: String,
}

/// Read-only view of the board handed to the render target.
#[derive(Copy, Clone, Debug)]
pub struct BoardView<'a> {
    pub board: &'a Board,
    pub phase: Phase,
    /// Controller cursor, `None` when it should not be drawn.
    pub cursor: Option<usize>,
}

impl BoardView<'_> {
    pub fn size(&self) -> GridSize {
        self.board.size()
    }

    pub fn face_at(&self, index: usize) -> CardFace {
        self.board.face_at(index, self.phase)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.cursor == Some(index)
    }

    /// Whether a tap on this cell could do anything right now.
    pub fn is_locked(&self, index: usize) -> bool {
        match self.phase {
            Phase::Playing => self.board.card(index).is_none_or(|card| !card.is_face_down()),
            Phase::Preview | Phase::Resolving | Phase::Ended => true,
        }
    }
}

/// Presentation surface the session writes to after every state change.
pub trait RenderBridge {
    fn paint_board(&mut self, view: BoardView<'_>);

    fn set_time_display(&mut self, time: &TimeDisplay);

    fn set_attempt_display(&mut self, attempts: u32);

    /// `Some` shows the game-over overlay with final stats, `None` hides it.
    fn show_game_over(&mut self, summary: Option<&GameSummary>);

    fn set_controller_status(&mut self, status: ControllerStatus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn time_display_text_and_label() {
        let countdown = TimeDisplay::Countdown(3);
        assert_eq!(countdown.to_string(), "3");
        assert_eq!(countdown.label(), "Countdown");

        let elapsed = TimeDisplay::Elapsed(format_elapsed(75));
        assert_eq!(elapsed.to_string(), "01:15");
        assert_eq!(elapsed.label(), "Time");
    }

    #[test]
    fn locked_cells_follow_phase() {
        let board = Dealer::new(1).deal(Difficulty::Easy).unwrap();
        let view = |phase| BoardView {
            board: &board,
            phase,
            cursor: Some(2),
        };

        assert!(view(Phase::Preview).is_locked(0));
        assert!(!view(Phase::Playing).is_locked(0));
        assert!(view(Phase::Playing).is_locked(16));
        assert!(view(Phase::Resolving).is_locked(0));
        assert!(view(Phase::Playing).is_selected(2));
        assert_eq!(view(Phase::Preview).face_at(0).symbol(), Some(board.card(0).unwrap().symbol));
        assert_eq!(view(Phase::Playing).face_at(0), CardFace::Hidden);
    }
}
