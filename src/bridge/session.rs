//! Per-association session constants
//!
//! The destination and the learned client address are shared by every
//! pooled connection of one association.

use crate::socks::UdpAddr;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing::debug;

/// Destination and peer of one UDP association
///
/// Built once and shared through `Arc`. The peer is write-once: the first
/// learned address sticks for the lifetime of the session, so a client that
/// changes its source port mid-session keeps receiving replies at the old
/// address.
#[derive(Debug)]
pub struct UdpSession {
    destination: UdpAddr,
    peer: OnceLock<SocketAddr>,
}

impl UdpSession {
    /// Create a session whose peer is not known yet
    pub fn new(destination: UdpAddr) -> Self {
        UdpSession {
            destination,
            peer: OnceLock::new(),
        }
    }

    /// Create a session with an already learned peer
    pub fn with_peer(destination: UdpAddr, peer: SocketAddr) -> Self {
        let session = Self::new(destination);
        let _ = session.peer.set(peer);
        session
    }

    /// Destination of the association
    pub fn destination(&self) -> &UdpAddr {
        &self.destination
    }

    /// Learned peer, if any
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer.get().copied()
    }

    /// Record `addr` as the peer unless one is already known
    ///
    /// Returns true when `addr` became the peer.
    pub fn learn_peer(&self, addr: SocketAddr) -> bool {
        let learned = self.peer.set(addr).is_ok();
        if learned {
            debug!("Learned UDP peer {} for {}", addr, self.destination);
        }
        learned
    }
}
