use crate::game::{SessionState, TickEngine};
use macroquad::prelude::*;
use shared::{Cell, CELL_SIZE};

const BACKGROUND: Color = BLACK;
const HEAD_COLOR: Color = BLUE;
const BODY_COLOR: Color = GREEN;
const APPLE_COLOR: Color = RED;
const SCORE_COLOR: Color = Color::new(0.0, 1.0, 1.0, 1.0);

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Draws one frame for the current session state.
    pub fn render(&self, engine: &TickEngine, scores: &[(String, u32)], online: bool) {
        clear_background(BACKGROUND);

        match engine.state() {
            SessionState::NotStarted => self.draw_start_prompt(),
            SessionState::Running | SessionState::Paused => {
                self.draw_board(engine);
                self.draw_leaderboard(scores);
                if engine.state() == SessionState::Paused {
                    self.draw_centered("Paused", self.height / 2.0, 30.0, RED);
                }
            }
            SessionState::GameOver => self.draw_game_over(engine.score()),
        }

        self.draw_connection(online);
    }

    fn draw_board(&self, engine: &TickEngine) {
        let board = engine.board();
        let size = CELL_SIZE as f32;

        let apple = board.apple();
        draw_circle(
            apple.x as f32 * size + size / 2.0,
            apple.y as f32 * size + size / 2.0,
            size / 2.0,
            APPLE_COLOR,
        );

        for (i, segment) in board.segments().iter().enumerate().rev() {
            let color = if i == 0 { HEAD_COLOR } else { BODY_COLOR };
            self.draw_cell(*segment, color);
        }
    }

    fn draw_cell(&self, cell: Cell, color: Color) {
        let size = CELL_SIZE as f32;
        draw_rectangle(cell.x as f32 * size, cell.y as f32 * size, size, size, color);
    }

    fn draw_leaderboard(&self, scores: &[(String, u32)]) {
        let font_size = 30.0;
        for (row, (name, score)) in scores.iter().enumerate() {
            let line = format!("{} {}", name, score);
            self.draw_centered(&line, font_size + row as f32 * 50.0, font_size, SCORE_COLOR);
        }
    }

    fn draw_start_prompt(&self) {
        let middle = self.height / 2.0;
        self.draw_centered("[Enter] start game", middle, 30.0, RED);
        self.draw_centered("[Space] pause game", middle + 50.0, 30.0, RED);
    }

    fn draw_game_over(&self, score: u32) {
        let middle = self.height / 2.0;
        self.draw_centered("Game Over", middle, 75.0, RED);
        self.draw_centered(&format!("Score: {}", score), middle + 50.0, 45.0, RED);
        self.draw_centered("Press Enter to play again", middle + 100.0, 45.0, BLUE);
    }

    fn draw_connection(&self, online: bool) {
        let color = if online { GREEN } else { RED };
        draw_rectangle(10.0, self.height - 18.0, 8.0, 8.0, color);
        draw_text(
            if online { "online" } else { "offline" },
            22.0,
            self.height - 10.0,
            16.0,
            WHITE,
        );
    }

    fn draw_centered(&self, text: &str, y: f32, font_size: f32, color: Color) {
        let dimensions = measure_text(text, None, font_size as u16, 1.0);
        draw_text(text, (self.width - dimensions.width) / 2.0, y, font_size, color);
    }
}
