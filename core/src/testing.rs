use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use core::cell::RefCell;

use crate::*;

#[derive(Debug)]
struct Pending {
    handle: u64,
    due_ms: u64,
    period_ms: Option<u64>,
    tick: Tick,
}

#[derive(Debug, Default)]
struct SchedulerInner {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<Pending>,
}

/// Scheduler driven by hand, time only moves through `pop_due` and `advance_to`.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler(Rc<RefCell<SchedulerInner>>);

impl ManualScheduler {
    pub fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    /// Fires the earliest timer due at or before `until_ms`, moving the clock to it.
    ///
    /// Ties go to the timer scheduled first.
    pub fn pop_due(&self, until_ms: u64) -> Option<Tick> {
        let mut inner = self.0.borrow_mut();
        let position = inner
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))
            .map(|(position, _)| position)?;

        let due_ms = inner.pending[position].due_ms;
        inner.now_ms = inner.now_ms.max(due_ms);
        let tick = inner.pending[position].tick;
        match inner.pending[position].period_ms {
            Some(period_ms) => inner.pending[position].due_ms += period_ms,
            None => {
                inner.pending.remove(position);
            }
        }
        Some(tick)
    }

    pub fn advance_to(&self, until_ms: u64) {
        let mut inner = self.0.borrow_mut();
        inner.now_ms = inner.now_ms.max(until_ms);
    }

    fn push(&self, delay_ms: u32, period_ms: Option<u64>, tick: Tick) -> u64 {
        let mut inner = self.0.borrow_mut();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        let due_ms = inner.now_ms + u64::from(delay_ms);
        inner.pending.push(Pending {
            handle,
            due_ms,
            period_ms,
            tick,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn now(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.now_ms()).unwrap();
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn schedule_once(&self, delay_ms: u32, tick: Tick) -> u64 {
        self.push(delay_ms, None, tick)
    }

    fn schedule_repeating(&self, period_ms: u32, tick: Tick) -> u64 {
        self.push(period_ms, Some(period_ms.into()), tick)
    }

    fn cancel(&self, handle: u64) {
        self.0
            .borrow_mut()
            .pending
            .retain(|timer| timer.handle != handle);
    }
}

/// Fires every timer due in the next `ms` milliseconds, in order.
pub fn run_for<R, C>(session: &mut GameSession<ManualScheduler, R, C>, scheduler: &ManualScheduler, ms: u64)
where
    R: RenderBridge,
    C: ControllerSource,
{
    let until_ms = scheduler.now_ms() + ms;
    while let Some(tick) = scheduler.pop_due(until_ms) {
        session.on_tick(tick);
    }
    scheduler.advance_to(until_ms);
}

/// Keeps every call the session makes to its render target.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub paints: usize,
    pub last_faces: Vec<CardFace>,
    pub last_cursor: Option<usize>,
    pub last_phase: Option<Phase>,
    pub times: Vec<TimeDisplay>,
    pub attempts: Vec<u32>,
    pub game_over: Vec<Option<GameSummary>>,
    pub statuses: Vec<ControllerStatus>,
}

impl RenderBridge for RecordingBridge {
    fn paint_board(&mut self, view: BoardView<'_>) {
        self.paints += 1;
        self.last_faces = (0..view.board.len()).map(|index| view.face_at(index)).collect();
        self.last_cursor = view.cursor;
        self.last_phase = Some(view.phase);
    }

    fn set_time_display(&mut self, time: &TimeDisplay) {
        self.times.push(time.clone());
    }

    fn set_attempt_display(&mut self, attempts: u32) {
        self.attempts.push(attempts);
    }

    fn show_game_over(&mut self, summary: Option<&GameSummary>) {
        self.game_over.push(summary.cloned());
    }

    fn set_controller_status(&mut self, status: ControllerStatus) {
        self.statuses.push(status);
    }
}

/// Controllers whose state the test sets directly.
#[derive(Clone, Debug, Default)]
pub struct ScriptedController(Rc<RefCell<BTreeMap<u32, ControllerSnapshot>>>);

impl ScriptedController {
    pub fn set(&self, index: u32, snapshot: ControllerSnapshot) {
        self.0.borrow_mut().insert(index, snapshot);
    }

    pub fn unplug(&self, index: u32) {
        self.0.borrow_mut().remove(&index);
    }
}

impl ControllerSource for ScriptedController {
    fn snapshot(&self, index: u32) -> Option<ControllerSnapshot> {
        self.0.borrow().get(&index).copied()
    }
}

pub fn pad(buttons: PadButtons) -> ControllerSnapshot {
    ControllerSnapshot {
        stick: (0.0, 0.0),
        buttons,
    }
}

pub fn stick(x: f64, y: f64) -> ControllerSnapshot {
    ControllerSnapshot {
        stick: (x, y),
        buttons: PadButtons::empty(),
    }
}

/// Dealer with a pool too small for the larger boards.
pub struct LimitedPool {
    available: usize,
    dealer: Dealer,
}

impl LimitedPool {
    pub fn new(available: usize) -> Self {
        Self {
            available,
            dealer: Dealer::new(0),
        }
    }
}

impl BoardGenerator for LimitedPool {
    fn deal(&mut self, difficulty: Difficulty) -> Result<Board> {
        let needed = usize::from(difficulty.pairs());
        if needed > self.available {
            return Err(GameError::SymbolPoolTooSmall {
                needed,
                available: self.available,
            });
        }
        self.dealer.deal(difficulty)
    }
}

/// Deals the same board every time: cards go `a b b a` in blocks of four.
pub struct FixedDeal;

impl BoardGenerator for FixedDeal {
    fn deal(&mut self, difficulty: Difficulty) -> Result<Board> {
        let total = usize::from(difficulty.total_cards());
        let cards = (0..total)
            .map(|index| {
                let block = index / 4;
                let offset = match index % 4 {
                    0 | 3 => 0,
                    _ => 1,
                };
                let symbol = u8::try_from(block * 2 + offset).unwrap();
                Card::new(SymbolId(symbol), CardId(u16::try_from(index).unwrap()))
            })
            .collect();
        let symbols = (0..total / 2).map(|symbol| alloc::format!("s{symbol}")).collect();
        Board::from_cards(difficulty.size(), cards, symbols)
    }
}
