use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings for the connection pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolSettings {
    /// number of connections the pool opens
    #[serde(default = "connections_default")]
    pub connections: usize,
    /// timeout for opening one connection (milliseconds)
    #[serde(default = "connect_timeout_default")]
    pub connect_timeout_ms: u64,
    /// delay between two polls of the pool status while it connects (milliseconds)
    #[serde(default = "poll_interval_default")]
    pub poll_interval_ms: u64,
    /// give up waiting for the pool to connect after this long (milliseconds)
    #[serde(default = "handshake_timeout_default")]
    pub handshake_timeout_ms: u64,
}

impl PoolSettings {
    pub fn is_default(&self) -> bool {
        self == &PoolSettings::default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

impl Default for PoolSettings {
    fn default() -> PoolSettings {
        PoolSettings {
            connections: connections_default(),
            connect_timeout_ms: connect_timeout_default(),
            poll_interval_ms: poll_interval_default(),
            handshake_timeout_ms: handshake_timeout_default(),
        }
    }
}

fn connections_default() -> usize {
    4
}

fn connect_timeout_default() -> u64 {
    5_000
}

fn poll_interval_default() -> u64 {
    10
}

fn handshake_timeout_default() -> u64 {
    30_000
}
