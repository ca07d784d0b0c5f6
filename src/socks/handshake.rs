//! SOCKS5 handshake for the local listener
//!
//! Only the "no authentication" method is offered; the request itself is
//! read with the shared header codec.

use super::consts::*;
use super::header::read_udp_header;
use super::types::UdpAddr;
use crate::error::Socks5Error;
use anyhow::{bail, Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Negotiate the authentication method
///
/// Reads `VER NMETHODS METHODS` and answers with "no authentication" when the
/// client offers it, or "no acceptable methods" otherwise.
pub async fn negotiate<S>(stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; 2];
    stream.read_exact(&mut buf).await?;

    if buf[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(buf[0]).into());
    }
    if buf[1] == 0 {
        bail!("No authentication methods provided");
    }

    let mut methods = vec![0u8; buf[1] as usize];
    stream.read_exact(&mut methods).await?;

    let selected = if methods.contains(&SOCKS5_AUTH_METHOD_NONE) {
        SOCKS5_AUTH_METHOD_NONE
    } else {
        SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE
    };

    stream.write_all(&[SOCKS5_VERSION, selected]).await?;
    stream.flush().await?;

    if selected == SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE {
        return Err(Socks5Error::NoAcceptableMethod.into());
    }

    debug!("SOCKS5 method negotiated: no authentication");
    Ok(())
}

/// Read the request following negotiation
///
/// Returns the command byte and the address the client announced.
pub async fn read_request<S>(stream: &mut S) -> Result<(u8, UdpAddr)>
where
    S: AsyncRead + Unpin,
{
    let (cmd, addr) = read_udp_header(stream, false)
        .await
        .context("Failed to read SOCKS5 request")?;
    debug!("SOCKS5 request: cmd={} addr={}", cmd, addr);
    Ok((cmd, addr))
}
