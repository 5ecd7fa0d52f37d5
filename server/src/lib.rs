//! # Score Relay Library
//!
//! This library provides the relay that lets snake players see each other's
//! scores. It holds no game state of its own: every player simulates locally
//! and reports its score, and the relay re-broadcasts each report to everyone.
//!
//! ## Core Responsibilities
//!
//! ### Client Management
//! Handles the lifecycle of player connections:
//! - Connection acceptance and `player<id>` name assignment
//! - Renaming when a player announces a name
//! - Capacity enforcement and disconnection cleanup
//!
//! ### Score Broadcasting
//! Every valid report becomes one `"<name>:<score>"` frame queued for every
//! connected player, the sender included. Reports from one connection are
//! broadcast in the order they arrived.
//!
//! ## Architecture Design
//!
//! ### Single-Owner Event Loop
//! The roster lives in the main loop only. Connection tasks decode frames and
//! hand reports over a channel, so roster updates and broadcasts are applied
//! one at a time without locking.
//!
//! ### TCP Framing
//! Each frame is a big-endian `u16` length followed by UTF-8 text. A frame
//! that fails to decode closes that one connection; other players are not
//! affected.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Player ids, names, last scores and outbound queues.
//!
//! ### Network Module (`network`)
//! Listener, per-connection reader and writer tasks, and the relay loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Relay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shared::BoxError> {
//!     let relay = Relay::bind(RelayConfig {
//!         bind_addr: "127.0.0.1:8888".to_string(),
//!         max_clients: 32,
//!     })
//!     .await?;
//!
//!     relay.run().await;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod network;
