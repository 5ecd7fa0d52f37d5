use clap::{Parser, ValueEnum};
use client::app::ClientConfig;
use client::game::GameConfig;
use log::{error, info};
use server::network::{Relay, RelayConfig};
use shared::{BoxError, DEFAULT_PORT, TICK_INTERVAL_MS};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run the score relay
    Server,
    /// Play the game, reporting scores to a relay
    Client,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Whether to run the relay or the game
    #[arg(value_enum, default_value_t = Mode::Client)]
    mode: Mode,

    /// Host to bind (server) or connect to (client)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Relay port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Name to report scores under instead of the relay-assigned one
    #[arg(short, long)]
    name: Option<String>,

    /// Milliseconds between game ticks
    #[arg(long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Maximum number of players the relay accepts at once
    #[arg(long, default_value_t = 32)]
    max_clients: usize,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        let host = self.host.as_deref().unwrap_or("0.0.0.0");
        RelayConfig {
            bind_addr: format!("{}:{}", host, self.port),
            max_clients: self.max_clients,
        }
    }

    fn client_config(&self) -> ClientConfig {
        let host = self.host.as_deref().unwrap_or("127.0.0.1");
        ClientConfig {
            relay_addr: format!("{}:{}", host, self.port),
            name: self.name.clone(),
            game: GameConfig {
                tick_interval: Duration::from_millis(self.tick_ms.max(1)),
                ..GameConfig::default()
            },
        }
    }
}

fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.mode {
        Mode::Server => run_relay(args.relay_config()),
        Mode::Client => {
            info!("Starting client, relay at {}", args.client_config().relay_addr);
            client::app::run(args.client_config())
        }
    }
}

fn run_relay(config: RelayConfig) -> Result<(), BoxError> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let relay = Relay::bind(config).await?;

        tokio::select! {
            _ = relay.run() => {
                error!("Relay loop stopped unexpectedly");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
        }

        Ok::<(), BoxError>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_client() {
        let args = Args::try_parse_from(["snake"]).unwrap();
        assert_eq!(args.mode, Mode::Client);
        assert_eq!(args.port, 8888);
        assert_eq!(args.client_config().relay_addr, "127.0.0.1:8888");
        assert_eq!(
            args.client_config().game.tick_interval,
            Duration::from_millis(55)
        );
    }

    #[test]
    fn test_server_mode_binds_all_interfaces() {
        let args = Args::try_parse_from(["snake", "server", "--port", "9000"]).unwrap();
        assert_eq!(args.mode, Mode::Server);

        let config = args.relay_config();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.max_clients, 32);
    }

    #[test]
    fn test_client_options() {
        let args = Args::try_parse_from([
            "snake", "client", "-H", "10.0.0.2", "--name", "alice", "--tick-ms", "100",
        ])
        .unwrap();

        let config = args.client_config();
        assert_eq!(config.relay_addr, "10.0.0.2:8888");
        assert_eq!(config.name.as_deref(), Some("alice"));
        assert_eq!(config.game.tick_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Args::try_parse_from(["snake", "spectator"]).is_err());
    }
}
