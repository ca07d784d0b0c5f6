//! TCP tunnel implementation
//!
//! Opens plain TCP connections to the remote relay. Each connection starts
//! with a SOCKS5-style request header naming the UDP destination, after
//! which the stream carries frames.

use super::{AddrMaybeCached, SocketOpts, Tunnel};
use crate::config::TcpConfig;
use crate::socks::{put_request_header, UdpAddr, SOCKS5_CMD_UDP_ASSOCIATE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// TCP tunnel to the remote relay
#[derive(Debug, Clone)]
pub struct TcpTunnel {
    /// Remote relay address
    remote_addr: AddrMaybeCached,
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout
    connect_timeout: Duration,
}

impl TcpTunnel {
    /// Create a tunnel to `remote_addr` with default options
    pub fn new(remote_addr: AddrMaybeCached) -> Self {
        TcpTunnel {
            remote_addr,
            socket_opts: SocketOpts::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Create a tunnel from TCP config
    pub fn from_config(remote_addr: AddrMaybeCached, config: &TcpConfig) -> Self {
        TcpTunnel {
            remote_addr,
            socket_opts: SocketOpts::from_tcp_config(config),
            connect_timeout: Duration::from_secs(config.connect_timeout),
        }
    }

    /// Set socket options
    pub fn with_socket_opts(mut self, opts: SocketOpts) -> Self {
        self.socket_opts = opts;
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Tunnel for TcpTunnel {
    type Stream = TcpStream;

    async fn open(&self, destination: &UdpAddr) -> Result<Self::Stream> {
        let resolved = self.remote_addr.resolve().await?;

        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(resolved))
            .await
            .with_context(|| format!("Connection timeout to {}", self.remote_addr.addr()))?
            .with_context(|| format!("Failed to connect to {}", self.remote_addr.addr()))?;

        self.socket_opts.apply(&stream)?;

        let mut preamble = BytesMut::with_capacity(destination.size());
        put_request_header(&mut preamble, SOCKS5_CMD_UDP_ASSOCIATE, destination);
        stream
            .write_all(&preamble)
            .await
            .context("Failed to send tunnel preamble")?;

        tracing::debug!("TCP tunnel to {} opened for {}", resolved, destination);

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socks::read_udp_header;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[test]
    fn test_tcp_tunnel_from_config() {
        let config = TcpConfig {
            connect_timeout: 3,
            ..Default::default()
        };
        let tunnel = TcpTunnel::from_config(AddrMaybeCached::new("127.0.0.1:1"), &config);
        assert_eq!(tunnel.connect_timeout, Duration::from_secs(3));
        assert!(tunnel.socket_opts.nodelay);
    }

    #[test]
    fn test_tcp_tunnel_builders() {
        let opts = SocketOpts {
            nodelay: false,
            keepalive_secs: None,
            keepalive_interval: None,
        };
        let tunnel = TcpTunnel::new(AddrMaybeCached::new("127.0.0.1:1"))
            .with_socket_opts(opts)
            .with_connect_timeout(Duration::from_secs(30));
        assert!(!tunnel.socket_opts.nodelay);
        assert_eq!(tunnel.connect_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_open_sends_destination_preamble() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let tunnel = TcpTunnel::new(AddrMaybeCached::from(addr));
        let dest = UdpAddr::ipv4(Ipv4Addr::new(8, 8, 8, 8), 53);

        let (opened, accepted) = tokio::join!(tunnel.open(&dest), listener.accept());
        opened.unwrap();
        let (mut server_side, _) = accepted.unwrap();

        let (cmd, parsed) = read_udp_header(&mut server_side, false).await.unwrap();
        assert_eq!(cmd, SOCKS5_CMD_UDP_ASSOCIATE);
        assert_eq!(parsed, dest);
    }

    #[tokio::test]
    async fn test_open_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tunnel = TcpTunnel::new(AddrMaybeCached::from(addr))
            .with_connect_timeout(Duration::from_millis(500));
        let dest = UdpAddr::ipv4(Ipv4Addr::LOCALHOST, 53);
        assert!(tunnel.open(&dest).await.is_err());
    }
}
