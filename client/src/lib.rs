//! # Snake Client Library
//!
//! This library provides the client side of the networked snake game: the
//! local fixed-rate game simulation, the score channel to the relay, the
//! shared leaderboard it feeds, and the window glue that ties them together.
//!
//! ## Architecture Overview
//!
//! Two execution contexts run per client process:
//!
//! ### Tick/UI Context
//! A single thread owns the window. Each frame it polls the keyboard, applies
//! the resulting commands to the [`game::TickEngine`], runs however many
//! fixed-interval ticks are due, and repaints. A tick never suspends, so
//! move, eat-check, collision-check and repaint for one frame always complete
//! before the next frame starts.
//!
//! ### Network Receive Context
//! A tokio task reads `"<name>:<score>"` frames from the relay and installs
//! them into the [`leaderboard::Leaderboard`]. It stops on the first closed
//! connection or malformed frame and takes the socket down with it. The game
//! keeps running without further updates.
//!
//! The leaderboard is the only state shared between the two; every write and
//! every snapshot goes through one mutex.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! - Board model: body buffer, apple, heading
//! - Tick engine: `NotStarted -> Running <-> Paused -> GameOver` transitions
//! - Fixed-interval ticker used by the frame loop
//!
//! ### Leaderboard Module (`leaderboard`)
//! Mutex-guarded map from player name to score with sorted snapshots.
//!
//! ### Network Module (`network`)
//! - TCP connection to the relay
//! - Non-blocking outbound score queue
//! - Receive loop feeding the leaderboard
//!
//! ### Input Module (`input`)
//! Arrow keys, Space and Enter mapped to engine commands.
//!
//! ### Rendering Module (`rendering`)
//! Draws the board, the leaderboard and the start, pause and game-over screens.
//!
//! ### App Module (`app`)
//! Opens the window, connects the score channel and runs the frame loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::app::{run, ClientConfig};
//!
//! fn main() -> Result<(), shared::BoxError> {
//!     run(ClientConfig {
//!         relay_addr: "127.0.0.1:8888".to_string(),
//!         name: Some("alice".to_string()),
//!         ..ClientConfig::default()
//!     })
//! }
//! ```

pub mod app;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod network;
pub mod rendering;
