//! Chat Relay Server - Entry Point
//!
//! Parses the command line, binds the listener and runs the accept loop.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::config::{DEFAULT_ADDR, DEFAULT_MAILBOX_CAPACITY};
use chat_relay::{ChatServer, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "chat_relay", about = "Room-based WebSocket chat relay")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CHAT_RELAY_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Per-client outbound queue size; events beyond it are dropped
    #[arg(long, env = "CHAT_RELAY_MAILBOX_CAPACITY", default_value_t = DEFAULT_MAILBOX_CAPACITY)]
    mailbox_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::new(args.addr).with_mailbox_capacity(args.mailbox_capacity);

    let server = ChatServer::bind(config).await?;
    info!("WebSocket Chat Relay listening on {}", server.local_addr()?);

    server.run().await?;
    Ok(())
}
