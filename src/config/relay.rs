//! Client and server configuration types
//!
//! Defines the main configuration structures for both ends of the relay.

use super::{PoolConfig, TransportConfig};
use serde::{Deserialize, Serialize};

/// Default UDP idle timeout in seconds
fn default_udp_idle_timeout() -> u64 {
    120
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Local SOCKS5 side
    #[serde(default)]
    pub client: Option<ClientConfig>,

    /// Far end of the tunnel
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.client.is_none() && self.server.is_none() {
            return Err("At least one of [client] or [server] must be configured".to_string());
        }
        if let Some(client) = &self.client {
            client.pool.validate()?;
        }
        if let Some(server) = &self.server {
            server.validate()?;
        }
        Ok(())
    }
}

/// Client configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Local SOCKS5 listen address (e.g., "127.0.0.1:1080")
    pub listen_addr: String,

    /// Remote relay server address (e.g., "relay.example.com:8100")
    pub remote_addr: String,

    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Relay pool configuration
    #[serde(default)]
    pub pool: PoolConfig,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Tunnel listen address (e.g., "0.0.0.0:8100")
    pub listen_addr: String,

    /// Seconds without traffic before a tunnel's UDP flow is torn down
    #[serde(default = "default_udp_idle_timeout")]
    pub udp_idle_timeout: u64,

    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.udp_idle_timeout == 0 {
            return Err("udp_idle_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}
