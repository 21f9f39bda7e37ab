use alloc::boxed::Box;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Preview -> Playing
/// - Playing -> Resolving
/// - Resolving -> Playing
/// - Resolving -> Ended
/// - any -> Preview, on reset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Whole board visible while the countdown runs
    #[default]
    Preview,
    /// Waiting for flips
    Playing,
    /// Two cards face up and not yet evaluated or turned back
    Resolving,
    /// Every pair matched
    Ended,
}

impl Phase {
    /// Whether controller cursor and confirm handling is paused.
    pub const fn suppresses_controller(self) -> bool {
        matches!(self, Self::Preview | Self::Resolving)
    }
}

/// Mutable per-game state, recreated on every reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    /// Cards flipped in the current pair, at most two.
    pub flipped: SmallVec<[usize; 2]>,
    pub matched_pairs: CardCount,
    pub attempts: u32,
    pub selected: usize,
    /// Seconds left in the preview.
    pub countdown: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Start-up options for a session.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub seed: u64,
    /// Touch-first devices get no controller support at all.
    pub touch_primary: bool,
}

/// One running memory game, bound to a scheduler, a render target and a controller source.
///
/// Every public method runs to completion as one reaction: state is updated first, then the render
/// bridge is told about it.
pub struct GameSession<S: Scheduler, R, C> {
    difficulty: Difficulty,
    generator: Box<dyn BoardGenerator>,
    board: Board,
    state: GameState,
    summary: Option<GameSummary>,
    epoch: Epoch,
    arbiter: ControllerArbiter,
    timers: Timers<S::Handle>,
    scheduler: S,
    render: R,
    controller: C,
}

impl<S, R, C> GameSession<S, R, C>
where
    S: Scheduler,
    R: RenderBridge,
    C: ControllerSource,
{
    /// Deals the first board and enters its preview.
    pub fn new(config: SessionConfig, scheduler: S, render: R, controller: C) -> Result<Self> {
        let generator = Box::new(Dealer::new(config.seed));
        Self::with_generator(config, generator, scheduler, render, controller)
    }

    pub fn with_generator(
        config: SessionConfig,
        mut generator: Box<dyn BoardGenerator>,
        scheduler: S,
        render: R,
        controller: C,
    ) -> Result<Self> {
        let board = generator.deal(config.difficulty)?;
        let mut session = Self {
            difficulty: config.difficulty,
            generator,
            board,
            state: GameState::default(),
            summary: None,
            epoch: Epoch::default(),
            arbiter: ControllerArbiter::new(config.touch_primary),
            timers: Timers::default(),
            scheduler,
            render,
            controller,
        };
        session.render.set_controller_status(session.arbiter.status());
        session.start_preview();
        Ok(session)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }

    pub fn matched_pairs(&self) -> CardCount {
        self.state.matched_pairs
    }

    pub fn flipped_indices(&self) -> &[usize] {
        &self.state.flipped
    }

    pub fn selected_index(&self) -> usize {
        self.state.selected
    }

    /// Final stats, present once the game ended.
    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn controller_status(&self) -> ControllerStatus {
        self.arbiter.status()
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Seconds on the elapsed clock, frozen once the game ended.
    pub fn elapsed_secs(&self) -> u32 {
        match self.state.started_at {
            Some(started_at) => {
                elapsed_secs(started_at, self.state.ended_at.unwrap_or_else(|| self.scheduler.now()))
            }
            None => 0,
        }
    }

    /// Selects a difficulty and starts a new game with it.
    pub fn configure_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        log::debug!("difficulty: {}", difficulty);
        self.reset_to(difficulty)
    }

    pub fn start_new_game(&mut self) -> Result<()> {
        self.reset_to(self.difficulty)
    }

    /// Dismisses the game-over overlay and plays again.
    pub fn acknowledge_game_over(&mut self) -> Result<()> {
        self.start_new_game()
    }

    /// Throws the current game away, cancelling its timers, and deals a fresh board.
    ///
    /// On a dealing error the current game is kept as is.
    pub fn reset_to(&mut self, difficulty: Difficulty) -> Result<()> {
        let board = self.generator.deal(difficulty)?;
        self.difficulty = difficulty;
        self.board = board;
        self.start_preview();
        Ok(())
    }

    /// Starts the current board over: every card face down, counters and clock cleared, then the
    /// whole board shown face up while the countdown runs.
    pub fn start_preview(&mut self) {
        self.timers.cancel_game(&self.scheduler);
        self.epoch = self.epoch.next();
        self.state = GameState {
            phase: Phase::Preview,
            countdown: PREVIEW_SECONDS,
            ..GameState::default()
        };
        self.summary = None;
        self.board.cover_all();
        log::debug!(
            "new {} game, epoch {:?}, preview for {}s",
            self.difficulty,
            self.epoch,
            PREVIEW_SECONDS
        );

        let handle = self
            .scheduler
            .schedule_repeating(CLOCK_TICK_MS, Tick::Countdown(self.epoch));
        self.timers.countdown.arm(&self.scheduler, handle);

        self.render.show_game_over(None);
        self.render.set_attempt_display(0);
        self.render
            .set_time_display(&TimeDisplay::Countdown(PREVIEW_SECONDS));
        self.paint();
    }

    /// Handles a timer the scheduler fired.
    pub fn on_tick(&mut self, tick: Tick) {
        use Tick::*;

        match tick {
            ControllerPoll => self.poll_controller(),
            Countdown(epoch) | ResolveMismatch(epoch) | ElapsedClock(epoch)
                if epoch != self.epoch =>
            {
                log::trace!("dropping stale tick: {:?}", tick);
            }
            Countdown(_) => self.countdown_tick(),
            ResolveMismatch(_) => self.resolve_mismatch(),
            ElapsedClock(_) => self.clock_tick(),
        }
    }

    /// Turns card `index` face up if the game accepts it, evaluating the pair on the second flip.
    ///
    /// Out-of-range indices, cards already face up, and any request outside `Playing` are ignored.
    pub fn request_flip(&mut self, index: usize) -> FlipOutcome {
        if self.state.phase != Phase::Playing {
            log::trace!("flip {} ignored in {:?}", index, self.state.phase);
            return FlipOutcome::NoChange;
        }

        let Some(card) = self.board.card_mut(index) else {
            log::trace!("flip {} out of range", index);
            return FlipOutcome::NoChange;
        };
        if !card.is_face_down() {
            return FlipOutcome::NoChange;
        }
        card.is_flipped = true;
        self.state.flipped.push(index);
        log::debug!("flip card {}", index);

        let clock_started = self.state.started_at.is_none();
        if clock_started {
            self.start_clock();
        }

        let outcome = if self.state.flipped.len() == 2 {
            self.state.attempts = self.state.attempts.saturating_add(1);
            self.state.phase = Phase::Resolving;
            self.evaluate_pair()
        } else {
            FlipOutcome::Flipped
        };

        if clock_started {
            self.render
                .set_time_display(&TimeDisplay::Elapsed(format_elapsed(0)));
        }
        if outcome.is_attempt() {
            self.render.set_attempt_display(self.state.attempts);
        }
        self.paint();
        if outcome == FlipOutcome::Won {
            self.show_summary();
        }

        outcome
    }

    pub fn controller_connected(&mut self, index: u32) {
        if !self.arbiter.connect(index) {
            log::debug!("controller {} not bound ({})", index, self.arbiter.status());
            return;
        }
        log::info!("controller {} connected", index);

        let handle = self
            .scheduler
            .schedule_repeating(CONTROLLER_POLL_MS, Tick::ControllerPoll);
        self.timers.controller.arm(&self.scheduler, handle);

        self.render.set_controller_status(self.arbiter.status());
        self.paint();
    }

    pub fn controller_disconnected(&mut self, index: u32) {
        if !self.arbiter.disconnect(index) {
            return;
        }
        log::info!("controller {} disconnected", index);
        self.timers.controller.cancel(&self.scheduler);

        self.render.set_controller_status(self.arbiter.status());
        self.paint();
    }

    fn start_clock(&mut self) {
        self.state.started_at = Some(self.scheduler.now());
        let handle = self
            .scheduler
            .schedule_repeating(CLOCK_TICK_MS, Tick::ElapsedClock(self.epoch));
        self.timers.elapsed.arm(&self.scheduler, handle);
    }

    fn evaluate_pair(&mut self) -> FlipOutcome {
        let (first, second) = (self.state.flipped[0], self.state.flipped[1]);
        let symbol_at = |index| self.board.card(index).map(|card| card.symbol);

        if symbol_at(first) != symbol_at(second) {
            log::debug!("mismatch: {} and {}", first, second);
            let handle = self
                .scheduler
                .schedule_once(MISMATCH_DELAY_MS, Tick::ResolveMismatch(self.epoch));
            self.timers.resolve.arm(&self.scheduler, handle);
            return FlipOutcome::Mismatched;
        }

        for index in self.state.flipped.drain(..) {
            if let Some(card) = self.board.card_mut(index) {
                card.is_matched = true;
            }
        }
        self.state.matched_pairs += 1;
        self.state.phase = Phase::Playing;
        log::debug!("match: {} and {}", first, second);

        if self.state.matched_pairs == self.board.total_pairs() {
            self.finish();
            FlipOutcome::Won
        } else {
            FlipOutcome::Matched
        }
    }

    fn resolve_mismatch(&mut self) {
        self.timers.resolve.clear();
        if self.state.phase != Phase::Resolving {
            return;
        }

        for index in self.state.flipped.drain(..) {
            if let Some(card) = self.board.card_mut(index) {
                card.is_flipped = false;
            }
        }
        self.state.phase = Phase::Playing;
        self.paint();
    }

    fn finish(&mut self) {
        if self.state.phase == Phase::Ended {
            return;
        }

        let now = self.scheduler.now();
        self.timers.elapsed.cancel(&self.scheduler);
        self.state.phase = Phase::Ended;
        self.state.ended_at = Some(now);

        let elapsed_secs = self.elapsed_secs();
        self.summary = Some(GameSummary {
            attempts: self.state.attempts,
            elapsed_secs,
            time: format_elapsed(elapsed_secs),
        });
        log::info!(
            "game won in {} attempts, {}s",
            self.state.attempts,
            elapsed_secs
        );
    }

    fn show_summary(&mut self) {
        if let Some(summary) = &self.summary {
            self.render
                .set_time_display(&TimeDisplay::Elapsed(summary.time.clone()));
            self.render.show_game_over(Some(summary));
        }
    }

    fn countdown_tick(&mut self) {
        if self.state.phase != Phase::Preview {
            return;
        }

        self.state.countdown = self.state.countdown.saturating_sub(1);
        self.render
            .set_time_display(&TimeDisplay::Countdown(self.state.countdown));

        if self.state.countdown == 0 {
            self.timers.countdown.cancel(&self.scheduler);
            self.state.phase = Phase::Playing;
            log::debug!("preview over");

            self.render
                .set_time_display(&TimeDisplay::Elapsed(format_elapsed(0)));
            self.paint();
        }
    }

    fn clock_tick(&mut self) {
        if self.state.started_at.is_none() || self.state.phase == Phase::Ended {
            return;
        }
        let time = format_elapsed(self.elapsed_secs());
        self.render.set_time_display(&TimeDisplay::Elapsed(time));
    }

    fn poll_controller(&mut self) {
        let Some(index) = self.arbiter.tracked() else {
            return;
        };
        let Some(snapshot) = self.controller.snapshot(index) else {
            log::trace!("controller {} returned no snapshot", index);
            return;
        };

        if self.state.phase.suppresses_controller() {
            self.arbiter.observe(&snapshot);
            return;
        }

        let actions = self
            .arbiter
            .poll(&snapshot, self.state.selected, self.board.size());
        if let Some(cursor) = actions.cursor {
            log::trace!("cursor {} -> {}", self.state.selected, cursor);
            self.state.selected = cursor;
        }

        let flipped = actions.confirm && self.request_flip(self.state.selected).has_update();
        if actions.cursor.is_some() && !flipped {
            self.paint();
        }
    }

    fn cursor(&self) -> Option<usize> {
        let visible = self.arbiter.tracked().is_some() && self.state.phase != Phase::Preview;
        visible.then_some(self.state.selected)
    }

    fn paint(&mut self) {
        let view = BoardView {
            board: &self.board,
            phase: self.state.phase,
            cursor: self.cursor(),
        };
        self.render.paint_board(view);
    }
}
