//! Test utilities and mocks for Sockbridge
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use sockbridge::config::{ClientConfig, PoolConfig, ServerConfig, TransportConfig};
use std::net::SocketAddr;
use tokio::io::{duplex, DuplexStream};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

/// Create a pair of connected duplex streams for testing
pub fn create_mock_stream_pair() -> (DuplexStream, DuplexStream) {
    duplex(1 << 17)
}

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Create a connected TCP stream pair for testing
pub async fn create_tcp_stream_pair() -> (TcpStream, TcpStream) {
    let (listener, addr) = create_test_listener().await;

    let connect_fut = TcpStream::connect(addr);
    let accept_fut = listener.accept();

    let (client_stream, accepted) = tokio::join!(connect_fut, accept_fut);
    let (server_stream, _) = accepted.unwrap();

    (client_stream.unwrap(), server_stream)
}

/// Spawn a UDP server that echoes every datagram back to its sender
pub async fn spawn_udp_echo() -> (SocketAddr, JoinHandle<()>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buf = vec![0u8; 65536];
        while let Ok((n, from)) = socket.recv_from(&mut buf).await {
            if socket.send_to(&buf[..n], from).await.is_err() {
                break;
            }
        }
    });

    (addr, handle)
}

/// Test configuration builder
pub struct TestConfigBuilder {
    remote_addr: String,
    fanout: usize,
    udp_idle_timeout: u64,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            remote_addr: "127.0.0.1:8100".to_string(),
            fanout: 1,
            udp_idle_timeout: 120,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set remote address
    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = addr.to_string();
        self
    }

    /// Set pool fanout
    pub fn fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    /// Set server UDP idle timeout
    pub fn udp_idle_timeout(mut self, secs: u64) -> Self {
        self.udp_idle_timeout = secs;
        self
    }

    /// Build the client configuration
    pub fn build_client(&self) -> ClientConfig {
        ClientConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            remote_addr: self.remote_addr.clone(),
            transport: TransportConfig::default(),
            pool: PoolConfig {
                fanout: self.fanout,
                poll_interval_ms: 20,
            },
        }
    }

    /// Build the server configuration
    pub fn build_server(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            udp_idle_timeout: self.udp_idle_timeout,
            transport: TransportConfig::default(),
        }
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use sockbridge::socks::*;
    use std::net::Ipv4Addr;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a UDP ASSOCIATE request with an all-zero client address
    pub fn create_udp_associate() -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_UDP_ASSOCIATE,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&Ipv4Addr::UNSPECIFIED.octets());
        cmd.extend_from_slice(&0u16.to_be_bytes());
        cmd
    }

    /// Create a SOCKS5 UDP datagram to an IPv4 destination
    pub fn create_udp_datagram(ip: [u8; 4], port: u16, payload: &[u8]) -> Vec<u8> {
        encode_udp_packet(&UdpAddr::ipv4(Ipv4Addr::from(ip), port), payload).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_mock_stream_pair() {
        let (mut a, mut b) = create_mock_stream_pair();

        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        a.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[tokio::test]
    async fn test_udp_echo() {
        let (addr, handle) = spawn_udp_echo().await;
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(b"ping", addr).await.unwrap();

        let mut buf = [0u8; 4];
        let (n, _) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
        handle.abort();
    }

    #[test]
    fn test_config_builder() {
        let builder = TestConfigBuilder::new().fanout(4).udp_idle_timeout(5);

        assert_eq!(builder.build_client().pool.fanout, 4);
        assert_eq!(builder.build_server().udp_idle_timeout, 5);
    }
}
