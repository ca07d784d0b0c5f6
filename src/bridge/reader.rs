//! Datagram to frame conversion
//!
//! Reads one datagram from the shared UDP socket and lays it out as one
//! length-prefixed frame.

use super::session::UdpSession;
use super::{FrameMode, FRAME_HEADER_LEN, MAX_FRAME_PAYLOAD, MIN_READ_BUFFER};
use crate::error::Result;
use crate::socks::parse_udp_header;
use bytes::Bytes;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;

/// Produces frames from datagrams received on the shared socket
#[derive(Debug)]
pub struct FrameReader {
    socket: Arc<UdpSocket>,
    session: Arc<UdpSession>,
    mode: FrameMode,
    /// Payload handed over by the pool, served once before the socket
    seed: Option<Bytes>,
}

impl FrameReader {
    /// Create a reader on `socket` for `session`
    pub fn new(socket: Arc<UdpSocket>, session: Arc<UdpSession>, mode: FrameMode) -> Self {
        FrameReader {
            socket,
            session,
            mode,
            seed: None,
        }
    }

    /// Serve `payload` as the first frame instead of reading the socket
    pub fn with_seed(mut self, payload: Bytes) -> Self {
        self.seed = Some(payload);
        self
    }

    /// True while a seed payload is still pending
    pub fn has_seed(&self) -> bool {
        self.seed.is_some()
    }

    /// Read one frame into `buf` and return its total length (prefix included)
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`MIN_READ_BUFFER`]. That is a caller
    /// bug, checked before any socket access.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        assert!(
            buf.len() >= MIN_READ_BUFFER,
            "frame read buffer must hold at least {} bytes, got {}",
            MIN_READ_BUFFER,
            buf.len()
        );

        let payload_len = match self.seed.take() {
            Some(seed) => {
                let len = seed.len().min(MAX_FRAME_PAYLOAD);
                buf[FRAME_HEADER_LEN..FRAME_HEADER_LEN + len].copy_from_slice(&seed[..len]);
                len
            }
            None => self.recv_payload(buf).await?,
        };

        buf[..FRAME_HEADER_LEN].copy_from_slice(&(payload_len as u16).to_be_bytes());
        debug!("Frame reader produced {} bytes", payload_len);

        Ok(payload_len + FRAME_HEADER_LEN)
    }

    /// Receive one datagram after the prefix slot and move its payload into place
    async fn recv_payload(&self, buf: &mut [u8]) -> Result<usize> {
        let slot = &mut buf[FRAME_HEADER_LEN..FRAME_HEADER_LEN + MAX_FRAME_PAYLOAD];
        let (n, src) = self.socket.recv_from(slot).await?;
        self.session.learn_peer(src);

        match self.mode {
            FrameMode::Raw => Ok(n),
            FrameMode::Socks => {
                let (_, dst) = parse_udp_header(&slot[..n], true)?;
                let size = dst.size();
                slot.copy_within(size..n, 0);
                Ok(n - size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::socks::{encode_udp_packet, UdpAddr};
    use std::net::{Ipv4Addr, SocketAddr};

    async fn local_socket() -> (Arc<UdpSocket>, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (Arc::new(socket), addr)
    }

    fn session() -> Arc<UdpSession> {
        Arc::new(UdpSession::new(UdpAddr::ipv4(Ipv4Addr::new(1, 2, 3, 4), 53)))
    }

    #[tokio::test]
    async fn test_seed_served_once() {
        let (socket, _) = local_socket().await;
        let mut reader =
            FrameReader::new(socket, session(), FrameMode::Socks).with_seed(Bytes::from_static(b"PING"));
        assert!(reader.has_seed());

        let mut buf = vec![0u8; MIN_READ_BUFFER];
        let n = reader.read(&mut buf).await.unwrap();

        assert_eq!(n, 6);
        assert_eq!(&buf[..2], &4u16.to_be_bytes());
        assert_eq!(&buf[2..6], b"PING");
        assert!(!reader.has_seed());
    }

    #[tokio::test]
    async fn test_socks_mode_strips_header() {
        let (socket, addr) = local_socket().await;
        let session = session();
        let mut reader = FrameReader::new(socket, session.clone(), FrameMode::Socks);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let packet = encode_udp_packet(&UdpAddr::domain("example.com", 53).unwrap(), b"payload");
        client.send_to(&packet, addr).await.unwrap();

        let mut buf = vec![0u8; MIN_READ_BUFFER];
        let n = reader.read(&mut buf).await.unwrap();

        assert_eq!(n, 2 + 7);
        assert_eq!(&buf[..2], &7u16.to_be_bytes());
        assert_eq!(&buf[2..n], b"payload");
        assert_eq!(session.peer(), Some(client.local_addr().unwrap()));
    }

    #[tokio::test]
    async fn test_raw_mode_keeps_datagram() {
        let (socket, addr) = local_socket().await;
        let mut reader = FrameReader::new(socket, session(), FrameMode::Raw);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&[0, 0, 0, 1, 9, 9], addr).await.unwrap();

        let mut buf = vec![0u8; MIN_READ_BUFFER];
        let n = reader.read(&mut buf).await.unwrap();

        assert_eq!(n, 8);
        assert_eq!(&buf[..2], &6u16.to_be_bytes());
        assert_eq!(&buf[2..8], &[0, 0, 0, 1, 9, 9]);
    }

    #[tokio::test]
    async fn test_socks_mode_malformed_header() {
        let (socket, addr) = local_socket().await;
        let mut reader = FrameReader::new(socket, session(), FrameMode::Socks);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&[0, 0, 0, 9, 0, 0, 0, 0], addr).await.unwrap();

        let mut buf = vec![0u8; MIN_READ_BUFFER];
        let err = reader.read(&mut buf).await.unwrap_err();
        assert!(matches!(err, BridgeError::Socks5(_)));
    }

    #[tokio::test]
    #[should_panic(expected = "frame read buffer must hold at least")]
    async fn test_undersized_buffer_panics() {
        let (socket, _) = local_socket().await;
        let mut reader = FrameReader::new(socket, session(), FrameMode::Socks);

        let mut buf = vec![0u8; 2048];
        let _ = reader.read(&mut buf).await;
    }
}
