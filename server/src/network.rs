//! Relay network layer: TCP accept loop, per-connection tasks and broadcast

use crate::client_manager::ClientManager;
use log::{debug, error, info, warn};
use shared::{
    read_frame, write_frame, BoxError, FrameError, ScoreReport, DEFAULT_PORT,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub max_clients: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            max_clients: 32,
        }
    }
}

/// Messages sent from connection tasks to the main relay loop
#[derive(Debug)]
pub enum RelayMessage {
    ReportReceived { client_id: u32, report: ScoreReport },
    Disconnected { client_id: u32 },
}

/// Score relay: every valid report is re-broadcast to all connected players.
///
/// The main loop owns the roster. Each connection gets a reader task, which
/// decodes reports and forwards them over `relay_tx`, and a writer task, which
/// drains that player's outbound queue. Reports from one connection are
/// forwarded and broadcast in arrival order.
pub struct Relay {
    listener: TcpListener,
    clients: ClientManager,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    relay_rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl Relay {
    pub async fn bind(config: RelayConfig) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);

        let (relay_tx, relay_rx) = mpsc::unbounded_channel();

        Ok(Relay {
            listener,
            clients: ClientManager::new(config.max_clients),
            relay_tx,
            relay_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections and relays scores until the task is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.admit(stream, addr),
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                },

                Some(message) = self.relay_rx.recv() => {
                    self.handle_message(message);
                },
            }
        }
    }

    fn admit(&mut self, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle for {}: {}", addr, e);
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let Some(client_id) = self.clients.add_client(addr, outbound_tx) else {
            warn!("Relay full, rejecting connection from {}", addr);
            return;
        };

        let relay_tx = self.relay_tx.clone();
        tokio::spawn(handle_connection(client_id, stream, outbound_rx, relay_tx));
    }

    fn handle_message(&mut self, message: RelayMessage) {
        match message {
            RelayMessage::ReportReceived { client_id, report } => {
                if let Some(update) = self.clients.record_score(client_id, &report) {
                    let delivered = self.clients.broadcast(&update.encode());
                    debug!("Relayed {} to {} clients", update, delivered);
                }
            }
            RelayMessage::Disconnected { client_id } => {
                self.clients.remove_client(&client_id);
            }
        }
    }
}

/// Reads reports from one player until the connection ends or misbehaves.
async fn handle_connection(
    client_id: u32,
    stream: TcpStream,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
) {
    let (mut reader, writer) = stream.into_split();
    let writer_task = tokio::spawn(write_outbound(client_id, writer, outbound_rx));

    loop {
        let payload = match read_frame(&mut reader).await {
            Ok(payload) => payload,
            Err(FrameError::Closed) => break,
            Err(e) => {
                warn!("Read from client {} failed: {}", client_id, e);
                break;
            }
        };

        let report = match payload.parse::<ScoreReport>() {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    "Malformed report {:?} from client {}: {}; closing connection",
                    payload, client_id, e
                );
                break;
            }
        };

        if relay_tx
            .send(RelayMessage::ReportReceived { client_id, report })
            .is_err()
        {
            break;
        }
    }

    writer_task.abort();
    let _ = relay_tx.send(RelayMessage::Disconnected { client_id });
}

async fn write_outbound(
    client_id: u32,
    mut writer: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(payload) = outbound_rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &payload).await {
            debug!("Write to client {} failed: {}", client_id, e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn spawn_relay(max_clients: usize) -> SocketAddr {
        let relay = Relay::bind(RelayConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            max_clients,
        })
        .await
        .unwrap();
        let addr = relay.local_addr().unwrap();
        tokio::spawn(relay.run());
        addr
    }

    async fn send(stream: &mut TcpStream, payload: &str) {
        write_frame(stream, payload).await.unwrap();
    }

    async fn recv(stream: &mut TcpStream) -> Result<String, FrameError> {
        timeout(WAIT, read_frame(stream)).await.unwrap()
    }

    /// Connects and waits until the relay echoes a first report back.
    async fn join(addr: SocketAddr, expected_name: &str) -> TcpStream {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        send(&mut stream, "0").await;
        assert_eq!(recv(&mut stream).await.unwrap(), format!("{}:0", expected_name));
        stream
    }

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8888");
        assert_eq!(config.max_clients, 32);
    }

    #[tokio::test]
    async fn test_report_broadcast_to_all() {
        let addr = spawn_relay(8).await;
        let mut first = join(addr, "player1").await;
        let mut second = join(addr, "player2").await;
        assert_eq!(recv(&mut first).await.unwrap(), "player2:0");

        send(&mut first, "1").await;

        assert_eq!(recv(&mut first).await.unwrap(), "player1:1");
        assert_eq!(recv(&mut second).await.unwrap(), "player1:1");
    }

    #[tokio::test]
    async fn test_reports_relayed_in_order() {
        let addr = spawn_relay(8).await;
        let mut first = join(addr, "player1").await;
        let mut second = join(addr, "player2").await;

        for score in 1..=5 {
            send(&mut first, &score.to_string()).await;
        }

        for score in 1..=5 {
            assert_eq!(recv(&mut second).await.unwrap(), format!("player1:{}", score));
        }
        assert_eq!(recv(&mut first).await.unwrap(), "player2:0");
    }

    #[tokio::test]
    async fn test_named_report() {
        let addr = spawn_relay(8).await;
        let mut first = join(addr, "player1").await;

        send(&mut first, "alice:7").await;
        assert_eq!(recv(&mut first).await.unwrap(), "alice:7");

        send(&mut first, "8").await;
        assert_eq!(recv(&mut first).await.unwrap(), "alice:8");
    }

    #[tokio::test]
    async fn test_malformed_report_closes_only_sender() {
        let addr = spawn_relay(8).await;
        let mut good = join(addr, "player1").await;
        let mut bad = join(addr, "player2").await;
        assert_eq!(recv(&mut good).await.unwrap(), "player2:0");

        send(&mut bad, "evil:name:3").await;
        assert!(recv(&mut bad).await.is_err());

        send(&mut good, "2").await;
        assert_eq!(recv(&mut good).await.unwrap(), "player1:2");
    }

    #[tokio::test]
    async fn test_full_relay_rejects_connection() {
        let addr = spawn_relay(1).await;
        let mut first = join(addr, "player1").await;

        let mut second = TcpStream::connect(addr).await.unwrap();
        assert!(recv(&mut second).await.is_err());

        send(&mut first, "4").await;
        assert_eq!(recv(&mut first).await.unwrap(), "player1:4");
    }

    #[tokio::test]
    async fn test_disconnect_frees_slot() {
        let addr = spawn_relay(1).await;
        let first = join(addr, "player1").await;
        drop(first);

        // The slot frees once the relay notices the disconnect.
        let mut second = None;
        for _ in 0..50 {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            if write_frame(&mut stream, "0").await.is_ok() {
                if let Ok(payload) = recv(&mut stream).await {
                    second = Some(payload);
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(second.unwrap().ends_with(":0"));
    }
}
