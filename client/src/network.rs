//! Score channel: one TCP connection to the relay.
//!
//! Outgoing scores are queued on an unbounded channel and written by a
//! dedicated task, so the tick loop never waits on the socket. A second task
//! reads relay broadcasts into the [`Leaderboard`] until the connection closes
//! or a frame fails to decode; when it stops it also stops the writer, which
//! drops both socket halves.

use crate::game::ScoreSink;
use crate::leaderboard::Leaderboard;
use log::{debug, info, warn};
use shared::{read_frame, validate_name, write_frame, BoxError, FrameError, ScoreReport, ScoreUpdate};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

/// Cloneable, non-blocking handle for submitting the local score.
#[derive(Debug, Clone)]
pub struct ScoreSender {
    tx: mpsc::UnboundedSender<u32>,
}

impl ScoreSender {
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ScoreSink for ScoreSender {
    fn submit(&mut self, score: u32) {
        if self.tx.send(score).is_err() {
            debug!("Score channel closed, dropping score {}", score);
        }
    }
}

pub struct ScoreChannel {
    sender: ScoreSender,
    receiver: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl ScoreChannel {
    /// Connects to the relay and starts the send and receive tasks.
    ///
    /// Must be called from within a tokio runtime. When `name` is set, every
    /// score report announces it; otherwise the relay picks a name.
    pub async fn connect(
        addr: &str,
        name: Option<String>,
        leaderboard: Leaderboard,
    ) -> Result<Self, BoxError> {
        if let Some(name) = &name {
            validate_name(name)?;
        }

        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let local_addr = stream.local_addr()?;
        info!("Connected to relay at {} from {}", addr, local_addr);

        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(run_sender(write_half, rx, name));
        let receiver = tokio::spawn(run_receiver(read_half, leaderboard, writer.abort_handle()));

        Ok(Self {
            sender: ScoreSender { tx },
            receiver,
            local_addr,
        })
    }

    pub fn sender(&self) -> ScoreSender {
        self.sender.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// True once the receive task has stopped and the connection is gone.
    pub fn is_finished(&self) -> bool {
        self.receiver.is_finished()
    }

    /// Waits for the receive task to stop.
    pub async fn closed(self) {
        if let Err(e) = self.receiver.await {
            warn!("Score receiver task failed: {}", e);
        }
    }
}

async fn run_sender(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<u32>,
    name: Option<String>,
) {
    while let Some(score) = rx.recv().await {
        let report = match &name {
            Some(name) => ScoreReport::named(name.as_str(), score),
            None => Ok(ScoreReport::anonymous(score)),
        };

        let result = match report {
            Ok(report) => write_frame(&mut writer, &report.encode()).await,
            Err(e) => {
                warn!("Not sending score {}: {}", score, e);
                continue;
            }
        };

        if let Err(e) = result {
            debug!("Failed to send score {}: {}", score, e);
            break;
        }
    }
}

async fn run_receiver(mut reader: OwnedReadHalf, leaderboard: Leaderboard, writer: AbortHandle) {
    loop {
        let payload = match read_frame(&mut reader).await {
            Ok(payload) => payload,
            Err(FrameError::Closed) => {
                info!("Relay closed the score channel");
                break;
            }
            Err(e) => {
                warn!("Score channel read failed: {}", e);
                break;
            }
        };

        match payload.parse::<ScoreUpdate>() {
            Ok(update) => {
                debug!("Score update {}", update);
                leaderboard.apply(update);
            }
            Err(e) => {
                warn!("Malformed score update {:?}: {}", payload, e);
                break;
            }
        }
    }

    writer.abort();
}
