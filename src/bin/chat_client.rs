//! Chat Relay Client - Entry Point
//!
//! Joins a room and relays stdin lines to it; type `/quit` to leave.

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use chat_relay::config::DEFAULT_ADDR;
use chat_relay::peer;
use chat_relay::RoomId;

#[derive(Debug, Parser)]
#[command(name = "chat_client", about = "Interactive client for the chat relay")]
struct Args {
    /// Relay server address
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Room to join
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    room: i32,

    /// Username, unique within the room
    #[arg(long, value_parser = non_empty)]
    user: String,
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("username must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let input = BufReader::new(tokio::io::stdin());

    peer::chat(&args.addr, RoomId(args.room), &args.user, input, tokio::io::stdout()).await?;
    Ok(())
}
