//! Roster of players connected to the relay
//!
//! This module tracks every live connection on the relay, including:
//! - Player id and display name assignment
//! - Capacity enforcement
//! - The outbound queue used to fan score updates out to each connection
//!
//! The roster is owned by the relay's main loop; connection tasks never touch
//! it directly.

use log::info;
use shared::{ScoreReport, ScoreUpdate};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// A connected player and the queue feeding its socket writer.
#[derive(Debug)]
pub struct Client {
    /// Unique id assigned by the relay, starting at 1
    pub id: u32,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// Name used in broadcasts; `player<id>` until the client announces one
    pub name: String,
    /// Last score this player reported
    pub score: Option<u32>,
    /// Frames waiting to be written to this player's socket
    pub outbound: mpsc::UnboundedSender<String>,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            addr,
            name: format!("player{}", id),
            score: None,
            outbound,
        }
    }
}

pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
}

impl ClientManager {
    /// Client ids start from 1 and increase for every accepted connection.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a connection, or returns None when the relay is full.
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let client = Client::new(client_id, addr, outbound);
        info!("{} connected from {}", client.name, addr);
        self.clients.insert(client_id, client);

        Some(client_id)
    }

    /// Removes a client; dropping its outbound sender ends its writer task.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("{} ({}) disconnected", client.name, client.addr);
            true
        } else {
            false
        }
    }

    pub fn get(&self, client_id: &u32) -> Option<&Client> {
        self.clients.get(client_id)
    }

    /// Applies a report from a client and returns the update to broadcast.
    ///
    /// A report that carries a name renames the player from then on.
    pub fn record_score(&mut self, client_id: u32, report: &ScoreReport) -> Option<ScoreUpdate> {
        let client = self.clients.get_mut(&client_id)?;

        if let Some(name) = report.name() {
            if name != client.name {
                info!("{} is now known as {}", client.name, name);
                client.name = name.to_string();
            }
        }
        client.score = Some(report.score());

        ScoreUpdate::new(client.name.clone(), report.score()).ok()
    }

    /// Queues a frame for every connected client and returns how many took it.
    pub fn broadcast(&self, payload: &str) -> usize {
        self.clients
            .values()
            .filter(|client| client.outbound.send(payload.to_string()).is_ok())
            .count()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
