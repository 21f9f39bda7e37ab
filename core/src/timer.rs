use alloc::format;
use alloc::string::String;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds the whole board stays visible before play starts.
pub const PREVIEW_SECONDS: u8 = 5;

/// Period of both the preview countdown and the elapsed clock.
pub const CLOCK_TICK_MS: u32 = 1000;

/// How long a mismatched pair stays face up.
pub const MISMATCH_DELAY_MS: u32 = 500;

/// Controller sampling period, 20 samples per second.
pub const CONTROLLER_POLL_MS: u32 = 50;

/// Counter bumped on every reset; ticks from an older epoch are ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u32);

impl Epoch {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Work a scheduler hands back to the session when a timer fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tick {
    Countdown(Epoch),
    ResolveMismatch(Epoch),
    ElapsedClock(Epoch),
    ControllerPoll,
}

/// Source of time and deferred work for the session.
///
/// Implementations deliver fired ticks back through `GameSession::on_tick`; they never call into
/// the session from inside `schedule_*`.
pub trait Scheduler {
    type Handle;

    fn now(&self) -> DateTime<Utc>;

    fn schedule_once(&self, delay_ms: u32, tick: Tick) -> Self::Handle;

    fn schedule_repeating(&self, period_ms: u32, tick: Tick) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

/// Slot for at most one pending timer; cancelling an empty slot does nothing.
#[derive(Debug)]
pub struct TimerSlot<H>(Option<H>);

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self(None)
    }
}

impl<H> TimerSlot<H> {
    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    /// Stores `handle`, cancelling whatever was armed before.
    pub fn arm<S: Scheduler<Handle = H>>(&mut self, scheduler: &S, handle: H) {
        self.cancel(scheduler);
        self.0 = Some(handle);
    }

    pub fn cancel<S: Scheduler<Handle = H>>(&mut self, scheduler: &S) {
        if let Some(handle) = self.0.take() {
            scheduler.cancel(handle);
        }
    }

    /// Forgets a one-shot timer that already fired.
    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// The timers owned by a session.
#[derive(Debug)]
pub struct Timers<H> {
    pub countdown: TimerSlot<H>,
    pub resolve: TimerSlot<H>,
    pub elapsed: TimerSlot<H>,
    pub controller: TimerSlot<H>,
}

impl<H> Default for Timers<H> {
    fn default() -> Self {
        Self {
            countdown: TimerSlot::default(),
            resolve: TimerSlot::default(),
            elapsed: TimerSlot::default(),
            controller: TimerSlot::default(),
        }
    }
}

impl<H> Timers<H> {
    /// Cancels everything tied to a single game, leaving controller polling alone.
    pub fn cancel_game<S: Scheduler<Handle = H>>(&mut self, scheduler: &S) {
        self.countdown.cancel(scheduler);
        self.resolve.cancel(scheduler);
        self.elapsed.cancel(scheduler);
    }
}

/// Whole seconds between `started_at` and `until`, clamped at zero.
pub fn elapsed_secs(started_at: DateTime<Utc>, until: DateTime<Utc>) -> u32 {
    (until - started_at)
        .num_seconds()
        .clamp(0, i64::from(u32::MAX)) as u32
}

/// `MM:SS`, minutes grow past two digits when needed.
pub fn format_elapsed(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
