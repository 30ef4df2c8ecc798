//! Server configuration.

use crate::error::ConfigError;

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:1990";

/// Outbound queue size per member. Bounds memory held for slow clients.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Settings for a [`ChatServer`](crate::ChatServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// Capacity of every member's mailbox. Events beyond it are dropped.
    pub mailbox_capacity: usize,
}

impl ServerConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Self::default()
        }
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::EmptyBindAddr);
        }
        // tokio's bounded channel panics on zero capacity
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::ZeroMailboxCapacity);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}
