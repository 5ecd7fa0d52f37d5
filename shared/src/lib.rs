//! Types and constants shared by the snake client and the score relay.

pub mod protocol;

pub use protocol::{
    encode_frame, read_frame, validate_name, write_frame, FrameError, MessageError, ScoreReport,
    ScoreUpdate,
};

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 800;
pub const CELL_SIZE: i32 = 15;
pub const GRID_WIDTH: i32 = SCREEN_WIDTH / CELL_SIZE;
pub const GRID_HEIGHT: i32 = SCREEN_HEIGHT / CELL_SIZE;
pub const INITIAL_BODY_LENGTH: usize = 3;
pub const TICK_INTERVAL_MS: u64 = 55;
pub const DEFAULT_PORT: u16 = 8888;
pub const FIELD_DELIMITER: char = ':';
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Error type returned by setup and process-level functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one grid unit away in `direction`.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_within(self, width: i32, height: i32) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid delta with y growing downwards, matching screen coordinates.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(GRID_WIDTH, 53);
        assert_eq!(GRID_HEIGHT, 53);
        assert!(GRID_WIDTH * CELL_SIZE <= SCREEN_WIDTH);
    }

    #[test]
    fn test_cell_offset() {
        let cell = Cell::new(4, 7);
        assert_eq!(cell.offset(Direction::Up), Cell::new(4, 6));
        assert_eq!(cell.offset(Direction::Down), Cell::new(4, 8));
        assert_eq!(cell.offset(Direction::Left), Cell::new(3, 7));
        assert_eq!(cell.offset(Direction::Right), Cell::new(5, 7));
    }

    #[test]
    fn test_cell_bounds() {
        assert!(Cell::ORIGIN.is_within(10, 10));
        assert!(Cell::new(9, 9).is_within(10, 10));
        assert!(!Cell::new(10, 9).is_within(10, 10));
        assert!(!Cell::new(3, -1).is_within(10, 10));
    }

    #[test]
    fn test_direction_opposites() {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert!(direction.is_opposite(direction.opposite()));
            assert!(!direction.is_opposite(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }
}
