//! SOCKS5 session handling
//!
//! Runs the handshake on one accepted connection and hands UDP ASSOCIATE
//! requests to the relay pool. The TCP connection stays open for the
//! lifetime of the association.

use crate::error::{BridgeError, Socks5ReplyCode};
use crate::pool::RelayPool;
use crate::socks::{negotiate, read_request, send_reply, SOCKS5_CMD_UDP_ASSOCIATE};
use crate::transport::Tunnel;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, warn};

/// Serve one SOCKS5 connection
///
/// Only UDP ASSOCIATE is supported; any other command is answered with
/// "command not supported". The relay socket is bound on the address the
/// client reached us on.
pub async fn handle_socks_connection<T: Tunnel>(
    mut stream: TcpStream,
    pool: Arc<RelayPool<T>>,
) -> Result<()> {
    negotiate(&mut stream)
        .await
        .context("SOCKS5 negotiation failed")?;

    let (cmd, announced) = match read_request(&mut stream).await {
        Ok(request) => request,
        Err(e) => {
            let code = match e.downcast_ref::<BridgeError>() {
                Some(BridgeError::Socks5(s5)) => Socks5ReplyCode::from(s5),
                _ => Socks5ReplyCode::GeneralFailure,
            };
            let _ = send_reply(&mut stream, code).await;
            return Err(e);
        }
    };

    if cmd != SOCKS5_CMD_UDP_ASSOCIATE {
        warn!("Unsupported SOCKS5 command {}", cmd);
        send_reply(&mut stream, Socks5ReplyCode::CommandNotSupported).await?;
        return Ok(());
    }

    if announced.is_all_zeros() {
        debug!("UDP ASSOCIATE without announced client address");
    } else {
        debug!("UDP ASSOCIATE announced client address {}", announced);
    }

    let local_ip = stream
        .local_addr()
        .context("Failed to get control connection address")?
        .ip();
    let socket = UdpSocket::bind((local_ip, 0))
        .await
        .with_context(|| format!("Failed to bind UDP relay on {}", local_ip))?;

    pool.run(socket, stream).await
}
