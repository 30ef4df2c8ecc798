//! ChatServer implementation
//!
//! Owns the TCP listener and the shared [`Hub`]. Every accepted connection
//! runs in its own task; nothing a connection does can stop the accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::hub::Hub;

/// A bound chat relay server
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ChatServer {
    listener: TcpListener,
    hub: Arc<Hub>,
    config: ServerConfig,
}

impl ChatServer {
    /// Validate `config` and bind its listen address.
    pub async fn bind(config: ServerConfig) -> Result<Self, AppError> {
        config.validate()?;
        let listener = TcpListener::bind(&config.bind_addr).await?;
        Ok(Self {
            listener,
            hub: Arc::new(Hub::new()),
            config,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared room registry.
    pub fn hub(&self) -> Arc<Hub> {
        Arc::clone(&self.hub)
    }

    /// Run the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), AppError> {
        info!("ChatServer started");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let hub = Arc::clone(&self.hub);
                    let capacity = self.config.mailbox_capacity;

                    // Spawn handler task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, hub, capacity).await {
                            debug!("Connection from {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
