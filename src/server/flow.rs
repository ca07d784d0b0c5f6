//! Server-side UDP flow
//!
//! One tunnel connection maps to one ephemeral UDP socket connected to the
//! destination named in the tunnel preamble. Datagrams from any other source
//! are discarded by the socket.

use crate::bridge::{FrameMode, UdpSession};
use crate::pool::PooledConnection;
use crate::socks::read_udp_header;
use anyhow::{Context, Result};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UdpSocket;
use tracing::info;

/// Serve one tunnel connection
///
/// Reads the `VER CMD RSV ATYP ADDR PORT` preamble, resolves the destination
/// and relays frames until the tunnel closes or the flow stays idle for
/// `idle_timeout`.
pub async fn handle_tunnel<S>(mut stream: S, idle_timeout: Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let (_, destination) = read_udp_header(&mut stream, false)
        .await
        .context("Failed to read tunnel preamble")?;
    let target = destination.resolve().await?;

    let bind_addr: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind UDP socket for {}", target))?;
    socket
        .connect(target)
        .await
        .with_context(|| format!("Failed to connect UDP socket to {}", target))?;
    info!(
        "UDP flow to {} ({}) via {}",
        destination,
        target,
        socket.local_addr()?
    );

    let session = Arc::new(UdpSession::with_peer(destination, target));
    PooledConnection::new(0, Arc::new(socket), session, FrameMode::Raw)
        .run(stream, Some(idle_timeout))
        .await
}
