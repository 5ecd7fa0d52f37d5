//! Window setup and the per-frame loop: input, fixed-rate ticks, repaint.

use crate::game::{GameConfig, ScoreSink, TickEngine, Ticker};
use crate::input::{dispatch, InputManager};
use crate::leaderboard::Leaderboard;
use crate::network::ScoreChannel;
use crate::rendering::Renderer;
use log::{debug, info, warn};
use macroquad::prelude::*;
use macroquad::Window;
use shared::{BoxError, DEFAULT_PORT, SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay address as `host:port`.
    pub relay_addr: String,
    pub name: Option<String>,
    pub game: GameConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            name: None,
            game: GameConfig::default(),
        }
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: "Snake".to_owned(),
        window_width: SCREEN_WIDTH,
        window_height: SCREEN_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

/// Connects the score channel and runs the game window until it closes.
///
/// The channel's tasks run on a small tokio runtime owned by this function;
/// the window loop itself stays on the calling thread. If the relay cannot be
/// reached the game is still playable, just without a shared leaderboard.
pub fn run(config: ClientConfig) -> Result<(), BoxError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("score-channel")
        .enable_all()
        .build()?;

    let leaderboard = Leaderboard::new();
    let channel = match runtime.block_on(ScoreChannel::connect(
        &config.relay_addr,
        config.name.clone(),
        leaderboard.clone(),
    )) {
        Ok(channel) => Some(channel),
        Err(e) => {
            warn!(
                "Could not reach relay at {}: {}; playing offline",
                config.relay_addr, e
            );
            None
        }
    };

    info!("Controls: arrows to steer, Space to pause, Enter to start");
    Window::from_config(window_conf(), game_loop(config.game, leaderboard, channel));

    drop(runtime);
    Ok(())
}

async fn game_loop(game: GameConfig, leaderboard: Leaderboard, channel: Option<ScoreChannel>) {
    let mut engine = TickEngine::new(game.clone());
    let mut ticker = Ticker::new(game.tick_interval);
    let mut input = InputManager::new();
    let renderer = Renderer::new(screen_width(), screen_height());
    let mut sink = channel.as_ref().map(ScoreChannel::sender);

    loop {
        for command in input.poll() {
            if let Err(e) = dispatch(command, &mut engine, &leaderboard) {
                debug!("Ignoring {:?}: {}", command, e);
            }
        }

        ticker.set_armed(engine.is_armed());
        run_due_ticks(&mut engine, &mut ticker, &mut sink, get_frame_time());

        let online = channel.as_ref().is_some_and(|c| !c.is_finished());
        renderer.render(&engine, &leaderboard.snapshot(), online);

        next_frame().await;
    }
}

fn run_due_ticks(
    engine: &mut TickEngine,
    ticker: &mut Ticker,
    sink: &mut impl ScoreSink,
    dt: f32,
) {
    for _ in 0..ticker.advance(dt) {
        if engine.tick(sink).game_over {
            ticker.set_armed(false);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, SessionState};
    use shared::{Cell, Direction};
    use std::time::Duration;

    #[test]
    fn test_default_config_targets_local_relay() {
        let config = ClientConfig::default();
        assert_eq!(config.relay_addr, "127.0.0.1:8888");
        assert_eq!(config.game.tick_interval, Duration::from_millis(55));
        assert!(config.name.is_none());
    }

    #[test]
    fn test_window_matches_screen() {
        let conf = window_conf();
        assert_eq!(conf.window_width, SCREEN_WIDTH);
        assert_eq!(conf.window_height, SCREEN_HEIGHT);
    }

    #[test]
    fn test_due_ticks_stop_at_game_over() {
        let segments = [Cell::new(18, 3), Cell::new(17, 3), Cell::new(16, 3)];
        let mut board = Board::from_segments(20, 20, &segments, Direction::Right);
        board.set_apple(Cell::new(0, 0));
        let mut engine = TickEngine::from_board(board, 1);
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.set_armed(engine.is_armed());
        let mut sink: Vec<u32> = Vec::new();

        run_due_ticks(&mut engine, &mut ticker, &mut sink, 0.045);

        assert_eq!(engine.state(), SessionState::GameOver);
        assert_eq!(engine.board().head(), Cell::new(20, 3));
        assert!(!ticker.is_armed());
    }

    #[test]
    fn test_due_ticks_idle_while_paused() {
        let mut engine = TickEngine::with_seed(GameConfig::default(), 12);
        engine.start().unwrap();
        engine.pause().unwrap();
        let before = engine.board().clone();

        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.set_armed(engine.is_armed());
        run_due_ticks(&mut engine, &mut ticker, &mut Vec::new(), 1.0);

        assert_eq!(engine.board(), &before);
    }
}
