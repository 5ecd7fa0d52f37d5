//! Keyboard commands and how they drive the tick engine

use crate::game::{SessionState, TickEngine, TransitionError};
use crate::leaderboard::Leaderboard;
use macroquad::prelude::*;
use shared::Direction;

const BOUND_KEYS: [KeyCode; 7] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Space,
    KeyCode::Enter,
    KeyCode::KpEnter,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Space: pause while running, resume while paused.
    TogglePause,
    /// Enter: start a fresh game or reset a finished one.
    Confirm,
}

pub fn command_for_key(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Space => Some(Command::TogglePause),
        KeyCode::Enter | KeyCode::KpEnter => Some(Command::Confirm),
        _ => None,
    }
}

/// Applies one command to the engine.
///
/// Turns outside a running game are ignored rather than reported.
pub fn dispatch(
    command: Command,
    engine: &mut TickEngine,
    leaderboard: &Leaderboard,
) -> Result<(), TransitionError> {
    match command {
        Command::Turn(direction) => {
            engine.steer(direction);
            Ok(())
        }
        Command::TogglePause => engine.toggle_pause(),
        Command::Confirm => match engine.state() {
            SessionState::GameOver => engine.restart(leaderboard),
            _ => engine.start(),
        },
    }
}

/// Collects key presses from the window once per frame.
#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Commands for keys pressed since the previous frame.
    pub fn poll(&mut self) -> Vec<Command> {
        BOUND_KEYS
            .iter()
            .filter(|key| is_key_pressed(**key))
            .filter_map(|key| command_for_key(*key))
            .collect()
    }
}
