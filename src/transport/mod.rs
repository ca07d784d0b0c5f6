//! Transport module for Sockbridge
//!
//! This module provides the tunnel abstraction the relay pool dials through,
//! and the plain TCP implementation.

mod addr;
mod tcp;

pub use addr::AddrMaybeCached;
pub use tcp::TcpTunnel;

use crate::config::TcpConfig;
use crate::socks::UdpAddr;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Socket options for configuring connections
#[derive(Debug, Clone)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// TCP keepalive timeout
    pub keepalive_secs: Option<u64>,
    /// TCP keepalive interval
    pub keepalive_interval: Option<u64>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: Some(20),
            keepalive_interval: Some(8),
        }
    }
}

impl SocketOpts {
    /// Create socket options from TCP config
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive_secs: Some(config.keepalive_secs),
            keepalive_interval: Some(config.keepalive_interval),
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if let (Some(timeout), Some(interval)) = (self.keepalive_secs, self.keepalive_interval) {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(timeout))
                .with_interval(Duration::from_secs(interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Tunnel trait for establishing upstream connections
///
/// One call yields one tunnel stream carrying frames for `destination`.
/// Retry and backoff, if any, belong to the implementation.
#[async_trait]
pub trait Tunnel: Debug + Send + Sync + 'static {
    /// The stream type produced by this tunnel
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + Debug + 'static;

    /// Open a tunnel connection for `destination`
    async fn open(&self, destination: &UdpAddr) -> Result<Self::Stream>;
}
