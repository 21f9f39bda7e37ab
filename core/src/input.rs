use bitflags::bitflags;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Analog stick magnitude a reading must exceed to count as a direction.
pub const STICK_DEADZONE: f64 = 0.85;

bitflags! {
    /// Digital controller buttons the game listens to.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PadButtons: u8 {
        const CONFIRM = 1;
        const UP      = 1 << 1;
        const DOWN    = 1 << 2;
        const LEFT    = 1 << 3;
        const RIGHT   = 1 << 4;
    }
}

impl PadButtons {
    /// D-pad buttons in the order they are checked, first match wins.
    const DPAD: [(PadButtons, Direction); 4] = [
        (PadButtons::RIGHT, Direction::Right),
        (PadButtons::LEFT, Direction::Left),
        (PadButtons::DOWN, Direction::Down),
        (PadButtons::UP, Direction::Up),
    ];
}

/// One sample of the tracked controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Left stick, x grows to the right and y grows downwards.
    pub stick: (f64, f64),
    pub buttons: PadButtons,
}

impl ControllerSnapshot {
    /// Horizontal and vertical stick directions past the deadzone.
    pub fn stick_directions(&self) -> (Option<Direction>, Option<Direction>) {
        let (x, y) = self.stick;
        (
            axis_direction(x, Direction::Left, Direction::Right),
            axis_direction(y, Direction::Up, Direction::Down),
        )
    }
}

fn axis_direction(value: f64, negative: Direction, positive: Direction) -> Option<Direction> {
    if value > STICK_DEADZONE {
        Some(positive)
    } else if value < -STICK_DEADZONE {
        Some(negative)
    } else {
        None
    }
}

/// Host-provided access to controller state.
pub trait ControllerSource {
    /// Current state of controller `index`, `None` if it is gone.
    fn snapshot(&self, index: u32) -> Option<ControllerSnapshot>;
}

/// What the controller status slot shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerStatus {
    Connected,
    Disconnected,
    Unsupported,
}

impl ControllerStatus {
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Unsupported => "unsupported on this device",
        })
    }
}

/// Actions derived from one controller poll.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PadActions {
    /// New cursor position, only set when it actually moved.
    pub cursor: Option<usize>,
    pub confirm: bool,
}

/// Turns controller samples into cursor moves and confirm presses.
///
/// Buttons are edge-triggered against the previous sample; the stick is level-triggered and moves
/// at most one cell per poll while held.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerArbiter {
    touch_primary: bool,
    tracked: Option<u32>,
    previous: PadButtons,
}

impl ControllerArbiter {
    pub fn new(touch_primary: bool) -> Self {
        Self {
            touch_primary,
            tracked: None,
            previous: PadButtons::empty(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !self.touch_primary
    }

    pub fn tracked(&self) -> Option<u32> {
        self.tracked
    }

    pub fn status(&self) -> ControllerStatus {
        match (self.is_supported(), self.tracked) {
            (false, _) => ControllerStatus::Unsupported,
            (true, Some(_)) => ControllerStatus::Connected,
            (true, None) => ControllerStatus::Disconnected,
        }
    }

    /// Binds controller `index`, replacing any previous one. Returns whether the binding changed.
    pub fn connect(&mut self, index: u32) -> bool {
        if !self.is_supported() || self.tracked == Some(index) {
            return false;
        }
        self.tracked = Some(index);
        self.previous = PadButtons::empty();
        true
    }

    /// Unbinds controller `index` if it is the tracked one.
    pub fn disconnect(&mut self, index: u32) -> bool {
        if self.tracked != Some(index) {
            return false;
        }
        self.tracked = None;
        self.previous = PadButtons::empty();
        true
    }

    /// Records a sample without acting on it, so held buttons need a release before firing later.
    pub fn observe(&mut self, snapshot: &ControllerSnapshot) {
        self.previous = snapshot.buttons;
    }

    pub fn poll(&mut self, snapshot: &ControllerSnapshot, cursor: usize, size: GridSize) -> PadActions {
        let pressed = snapshot.buttons & !self.previous;
        self.previous = snapshot.buttons;

        // a vertical stick step wins when both axes are past the deadzone and it fits the grid
        let (horizontal, vertical) = snapshot.stick_directions();
        let step = |direction: Option<Direction>| direction.and_then(|d| d.step(cursor, size));
        let mut target = step(vertical).or_else(|| step(horizontal));

        if let Some(moved) = PadButtons::DPAD
            .into_iter()
            .filter(|(button, _)| pressed.contains(*button))
            .find_map(|(_, direction)| direction.step(cursor, size))
        {
            target = Some(moved);
        }

        PadActions {
            cursor: target.filter(|&index| index != cursor),
            confirm: pressed.contains(PadButtons::CONFIRM),
        }
    }
}
