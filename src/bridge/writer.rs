//! Frame to datagram conversion
//!
//! Accepts tunnel bytes in arbitrary chunks, reassembles frames and sends
//! each one to the session peer as a datagram.

use super::assembler::{FrameAssembler, ReassemblyState};
use super::session::UdpSession;
use super::FrameMode;
use crate::error::Result;
use crate::socks::encode_udp_packet;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, error, warn};

/// Emits reassembled frames as datagrams on the shared socket
#[derive(Debug)]
pub struct FrameWriter {
    socket: Arc<UdpSocket>,
    session: Arc<UdpSession>,
    mode: FrameMode,
    assembler: FrameAssembler,
}

impl FrameWriter {
    /// Create a writer on `socket` for `session`
    pub fn new(socket: Arc<UdpSocket>, session: Arc<UdpSession>, mode: FrameMode) -> Self {
        FrameWriter {
            socket,
            session,
            mode,
            assembler: FrameAssembler::new(),
        }
    }

    /// Reassembly state, for diagnostics
    pub fn state(&self) -> ReassemblyState {
        self.assembler.state()
    }

    /// Consume `chunk` and send every frame it completes
    ///
    /// On success the whole chunk is accepted: the return value is always
    /// `chunk.len()`.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<usize> {
        for payload in self.assembler.feed(chunk) {
            if let Err(e) = self.send(&payload).await {
                error!("Frame writer send failed: {}", e);
                return Err(e);
            }
        }

        debug!("Frame writer accepted {} bytes", chunk.len());
        Ok(chunk.len())
    }

    /// Send one payload to the peer, wrapping it in SOCKS mode
    async fn send(&self, payload: &[u8]) -> Result<()> {
        let Some(peer) = self.session.peer() else {
            warn!("Dropping {}-byte frame: UDP peer not learned yet", payload.len());
            return Ok(());
        };

        match self.mode {
            FrameMode::Raw => {
                self.socket.send_to(payload, peer).await?;
            }
            FrameMode::Socks => {
                let packet = encode_udp_packet(self.session.destination(), payload);
                self.socket.send_to(&packet, peer).await?;
            }
        }

        Ok(())
    }
}
