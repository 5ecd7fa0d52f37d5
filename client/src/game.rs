//! Board model, tick engine and the fixed-interval ticker that drives it.

use crate::leaderboard::Leaderboard;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    Cell, Direction, GRID_HEIGHT, GRID_WIDTH, INITIAL_BODY_LENGTH, TICK_INTERVAL_MS,
};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on ticks run for a single frame after a stall.
const MAX_CATCH_UP_TICKS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub tick_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {state:?}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: SessionState,
}

/// Snake body, apple and heading on a bounded grid.
///
/// The body lives in a fixed buffer with one slot per grid cell plus a spare;
/// only the first `len()` entries are live and index 0 is the head. The spare
/// slot keeps the cell the tail just left, which becomes the new tail segment
/// when the snake grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    body: Vec<Cell>,
    length: usize,
    apple: Cell,
    direction: Direction,
    heading: Direction,
    width: i32,
    height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        let capacity = (width.max(1) * height.max(1)) as usize;
        Self {
            body: vec![Cell::ORIGIN; capacity.max(INITIAL_BODY_LENGTH) + 1],
            length: INITIAL_BODY_LENGTH,
            apple: Cell::ORIGIN,
            direction: Direction::Right,
            heading: Direction::Right,
            width,
            height,
        }
    }

    /// Builds a board with an explicit body, head first.
    ///
    /// Bodies shorter than the initial length are padded with copies of their
    /// last segment.
    pub fn from_segments(
        width: i32,
        height: i32,
        segments: &[Cell],
        direction: Direction,
    ) -> Self {
        debug_assert!(!segments.is_empty(), "a snake needs at least a head");

        let mut board = Self::new(width, height);
        let capacity = board.capacity().max(segments.len());
        board.body = vec![Cell::ORIGIN; capacity + 1];

        let tail = segments.last().copied().unwrap_or(Cell::ORIGIN);
        for (slot, cell) in board.body.iter_mut().enumerate() {
            *cell = segments.get(slot).copied().unwrap_or(tail);
        }

        board.length = segments.len().max(INITIAL_BODY_LENGTH);
        board.direction = direction;
        board.heading = direction;
        board
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Maximum number of live segments.
    pub fn capacity(&self) -> usize {
        self.body.len() - 1
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn segments(&self) -> &[Cell] {
        &self.body[..self.length]
    }

    pub fn apple(&self) -> Cell {
        self.apple
    }

    pub fn set_apple(&mut self, apple: Cell) {
        self.apple = apple;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Requests a new direction for the next move.
    ///
    /// Turning back onto the current direction, or onto the direction the
    /// snake actually moved last tick, is refused. Returns whether the
    /// requested direction is now in effect.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(self.direction) || direction.is_opposite(self.heading) {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Shifts every segment into its predecessor's cell and moves the head.
    pub fn advance(&mut self) {
        debug_assert!(self.length > 0, "advance called on an empty body");
        if self.length == 0 {
            return;
        }

        let last = self.length.min(self.capacity());
        for i in (1..=last).rev() {
            self.body[i] = self.body[i - 1];
        }

        self.heading = self.direction;
        self.body[0] = self.body[0].offset(self.direction);
    }

    pub fn grow(&mut self) {
        debug_assert!(self.length < self.capacity(), "snake fills the board");
        if self.length < self.capacity() {
            self.length += 1;
        }
    }

    pub fn head_on_apple(&self) -> bool {
        self.head() == self.apple
    }

    pub fn head_hits_body(&self) -> bool {
        let head = self.head();
        self.segments()[1..].contains(&head)
    }

    pub fn head_out_of_bounds(&self) -> bool {
        !self.head().is_within(self.width, self.height)
    }

    fn reset(&mut self) {
        self.body.fill(Cell::ORIGIN);
        self.length = INITIAL_BODY_LENGTH;
        self.apple = Cell::ORIGIN;
        self.direction = Direction::Right;
        self.heading = Direction::Right;
    }
}

/// Destination for score changes produced by the tick engine.
pub trait ScoreSink {
    fn submit(&mut self, score: u32);
}

impl ScoreSink for Vec<u32> {
    fn submit(&mut self, score: u32) {
        self.push(score);
    }
}

impl<S: ScoreSink> ScoreSink for Option<S> {
    fn submit(&mut self, score: u32) {
        if let Some(sink) = self {
            sink.submit(score);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub ate_apple: bool,
    pub game_over: bool,
}

/// Fixed-rate state machine for one game session.
///
/// `NotStarted -> Running <-> Paused`, `Running -> GameOver -> NotStarted`.
pub struct TickEngine {
    config: GameConfig,
    board: Board,
    state: SessionState,
    score: u32,
    rng: StdRng,
}

impl TickEngine {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose apple placements are reproducible.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Running engine around an existing board; the board's apple is kept.
    pub fn from_board(board: Board, seed: u64) -> Self {
        let config = GameConfig {
            width: board.width(),
            height: board.height(),
            ..GameConfig::default()
        };
        Self {
            config,
            board,
            state: SessionState::Running,
            score: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            board: Board::new(config.width, config.height),
            config,
            state: SessionState::NotStarted,
            score: 0,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Whether the fixed-interval tick should be firing.
    pub fn is_armed(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.expect_state(SessionState::NotStarted, "start")?;
        self.place_apple();
        self.state = SessionState::Running;
        info!("Game started, apple at {:?}", self.board.apple());
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.expect_state(SessionState::Running, "pause")?;
        self.state = SessionState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.expect_state(SessionState::Paused, "resume")?;
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Resets the board, score and leaderboard after a lost game.
    pub fn restart(&mut self, leaderboard: &Leaderboard) -> Result<(), TransitionError> {
        self.expect_state(SessionState::GameOver, "restart")?;
        self.board.reset();
        self.score = 0;
        leaderboard.clear();
        self.state = SessionState::NotStarted;
        info!("Game reset");
        Ok(())
    }

    /// Changes direction for the next tick; ignored unless running.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.board.steer(direction)
    }

    /// Advances the game by one step: move, eat, then collide.
    pub fn tick(&mut self, sink: &mut impl ScoreSink) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.state != SessionState::Running {
            return outcome;
        }

        self.board.advance();

        if self.board.head_on_apple() {
            self.board.grow();
            self.score += 1;
            sink.submit(self.score);
            self.place_apple();
            outcome.ate_apple = true;
            debug!(
                "Apple eaten, score {} length {}",
                self.score,
                self.board.len()
            );
        }

        if self.board.head_hits_body() || self.board.head_out_of_bounds() {
            self.state = SessionState::GameOver;
            outcome.game_over = true;
            info!(
                "Game over at {:?} with score {}",
                self.board.head(),
                self.score
            );
        }

        outcome
    }

    // May land under the snake; placement only guarantees the cell is in bounds.
    fn place_apple(&mut self) {
        let apple = Cell::new(
            self.rng.gen_range(0..self.config.width),
            self.rng.gen_range(0..self.config.height),
        );
        self.board.set_apple(apple);
    }

    fn expect_state(
        &self,
        expected: SessionState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransitionError {
                action,
                state: self.state,
            })
        }
    }
}

/// Turns variable frame times into a whole number of fixed-interval ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: f32,
    accumulated: f32,
    armed: bool,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f32().max(f32::EPSILON),
            accumulated: 0.0,
            armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arms or disarms the ticker; re-arming starts a fresh interval.
    pub fn set_armed(&mut self, armed: bool) {
        if armed && !self.armed {
            self.accumulated = 0.0;
        }
        self.armed = armed;
    }

    /// Time carried over towards the next tick, in seconds.
    pub fn pending(&self) -> f32 {
        self.accumulated
    }

    /// Adds `dt` seconds and returns how many ticks are due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.armed {
            return 0;
        }

        self.accumulated += dt.max(0.0);
        let mut ticks = 0;
        while self.accumulated >= self.interval && ticks < MAX_CATCH_UP_TICKS {
            self.accumulated -= self.interval;
            ticks += 1;
        }

        if ticks == MAX_CATCH_UP_TICKS {
            self.accumulated = self.accumulated.min(self.interval);
        }
        ticks
    }
}
