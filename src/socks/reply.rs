//! SOCKS5 reply builder
//!
//! Constructs the replies the local listener sends on the control connection.

use super::consts::*;
use crate::error::Socks5ReplyCode;
use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Build the UDP ASSOCIATE success reply for a relay bound to `port`
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
pub fn associate_reply(port: u16) -> [u8; 10] {
    let mut reply = UDP_ASSOCIATE_OK_REPLY;
    reply[8..].copy_from_slice(&port.to_be_bytes());
    reply
}

/// Send the UDP ASSOCIATE success reply
pub async fn send_associate_reply<S>(stream: &mut S, port: u16) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&associate_reply(port)).await?;
    stream.flush().await?;
    Ok(())
}

/// Send a reply with `code` and an all-zero bind address
pub async fn send_reply<S>(stream: &mut S, code: Socks5ReplyCode) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut reply = UDP_ASSOCIATE_OK_REPLY;
    reply[1] = code.into();
    stream.write_all(&reply).await?;
    stream.flush().await?;
    Ok(())
}
