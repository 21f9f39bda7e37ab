use chrono::{DateTime, Utc};
use gloo::timers::callback::{Interval, Timeout};
use pairmatch_core as game;
use wasm_bindgen::JsCast;
use web_sys::{Gamepad, GamepadButton};
use yew::html::Scope;

use crate::app::{GameView, Msg};
use crate::utils::*;
use game::{ControllerSnapshot, PadButtons};

/// Timers backed by the browser event loop, fired ticks come back as component messages.
pub(crate) struct WebScheduler {
    link: Scope<GameView>,
}

impl WebScheduler {
    pub(crate) fn new(link: Scope<GameView>) -> Self {
        Self { link }
    }
}

/// Dropping a gloo timer cancels it.
pub(crate) enum WebTimer {
    Once { _timeout: Timeout },
    Repeating { _interval: Interval },
}

impl game::Scheduler for WebScheduler {
    type Handle = WebTimer;

    fn now(&self) -> DateTime<Utc> {
        utc_now()
    }

    fn schedule_once(&self, delay_ms: u32, tick: game::Tick) -> WebTimer {
        let link = self.link.clone();
        WebTimer::Once {
            _timeout: Timeout::new(delay_ms, move || link.send_message(Msg::Tick(tick))),
        }
    }

    fn schedule_repeating(&self, period_ms: u32, tick: game::Tick) -> WebTimer {
        let link = self.link.clone();
        WebTimer::Repeating {
            _interval: Interval::new(period_ms, move || link.send_message(Msg::Tick(tick))),
        }
    }

    fn cancel(&self, handle: WebTimer) {
        drop(handle);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CellModel {
    pub face: game::CardFace,
    /// Emoji shown on the face, `None` while face down.
    pub symbol: Option<String>,
    pub locked: bool,
    pub selected: bool,
}

/// Everything the page shows, kept up to date by the session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Screen {
    pub cols: game::Coord,
    pub cells: Vec<CellModel>,
    pub time: game::TimeDisplay,
    pub attempts: u32,
    pub game_over: Option<game::GameSummary>,
    pub controller: game::ControllerStatus,
    revision: u64,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            cols: 0,
            cells: Vec::new(),
            time: game::TimeDisplay::Countdown(game::PREVIEW_SECONDS),
            attempts: 0,
            game_over: None,
            controller: game::ControllerStatus::Disconnected,
            revision: 0,
        }
    }
}

impl Screen {
    /// Bumped on every change, so the component knows when to re-render.
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl game::RenderBridge for Screen {
    fn paint_board(&mut self, view: game::BoardView<'_>) {
        let (_, cols) = view.size();
        let cells: Vec<_> = (0..view.board.len())
            .map(|index| {
                let face = view.face_at(index);
                CellModel {
                    face,
                    symbol: face
                        .symbol()
                        .and_then(|symbol| view.board.symbol_name(symbol))
                        .map(str::to_string),
                    locked: view.is_locked(index),
                    selected: view.is_selected(index),
                }
            })
            .collect();

        if self.cols != cols || self.cells != cells {
            self.cols = cols;
            self.cells = cells;
            self.touch();
        }
    }

    fn set_time_display(&mut self, time: &game::TimeDisplay) {
        if &self.time != time {
            self.time = time.clone();
            self.touch();
        }
    }

    fn set_attempt_display(&mut self, attempts: u32) {
        if self.attempts != attempts {
            self.attempts = attempts;
            self.touch();
        }
    }

    fn show_game_over(&mut self, summary: Option<&game::GameSummary>) {
        let summary = summary.cloned();
        if self.game_over != summary {
            self.game_over = summary;
            self.touch();
        }
    }

    fn set_controller_status(&mut self, status: game::ControllerStatus) {
        if self.controller != status {
            self.controller = status;
            self.touch();
        }
    }
}

/// Standard gamepad mapping: A, then the d-pad.
const STANDARD_BUTTONS: [(u32, PadButtons); 5] = [
    (0, PadButtons::CONFIRM),
    (12, PadButtons::UP),
    (13, PadButtons::DOWN),
    (14, PadButtons::LEFT),
    (15, PadButtons::RIGHT),
];

/// Reads controllers through `navigator.getGamepads()`.
pub(crate) struct NavigatorPads;

impl game::ControllerSource for NavigatorPads {
    fn snapshot(&self, index: u32) -> Option<ControllerSnapshot> {
        connected_gamepads()
            .find(|gamepad| gamepad.index() == index)
            .map(|gamepad| read_gamepad(&gamepad))
    }
}

pub(crate) fn connected_gamepads() -> impl Iterator<Item = Gamepad> {
    let gamepads = gloo::utils::window()
        .navigator()
        .get_gamepads()
        .map_err(|err| log::error!("failed to list gamepads: {:?}", err))
        .ok();

    gamepads
        .into_iter()
        .flat_map(|gamepads| gamepads.to_vec())
        .filter_map(|value| value.dyn_into::<Gamepad>().ok())
        .filter(Gamepad::connected)
}

fn read_gamepad(gamepad: &Gamepad) -> ControllerSnapshot {
    let buttons = gamepad.buttons();
    let pressed = |index: u32| {
        buttons
            .get(index)
            .dyn_into::<GamepadButton>()
            .is_ok_and(|button| button.pressed())
    };

    let axes = gamepad.axes();
    let axis = |index: u32| axes.get(index).as_f64().unwrap_or(0.0);

    ControllerSnapshot {
        stick: (axis(0), axis(1)),
        buttons: STANDARD_BUTTONS
            .into_iter()
            .filter(|&(index, _)| pressed(index))
            .fold(PadButtons::empty(), |acc, (_, button)| acc | button),
    }
}

const TOUCH_USER_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Phones and tablets get no controller support.
pub(crate) fn is_touch_primary(user_agent: &str, max_touch_points: i32) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    TOUCH_USER_AGENTS
        .iter()
        .any(|token| user_agent.contains(token))
        || max_touch_points > 2
}

/// Two or more fingers on the board means a pinch, which must not zoom the page.
pub(crate) fn is_pinch(touch_count: u32) -> bool {
    touch_count > 1
}

pub(crate) fn detect_touch_primary() -> bool {
    let navigator = gloo::utils::window().navigator();
    let user_agent = navigator.user_agent().unwrap_or_default();
    let touch_primary = is_touch_primary(&user_agent, navigator.max_touch_points());
    log::debug!("touch primary: {}", touch_primary);
    touch_primary
}
