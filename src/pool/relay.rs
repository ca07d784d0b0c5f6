//! UDP relay pool
//!
//! Serves one UDP ASSOCIATE: announces the relay socket, learns the
//! destination from the first datagram, dials `fanout` tunnel connections and
//! waits until every one of them has terminated.

use super::connection::PooledConnection;
use super::stats::PoolStats;
use crate::bridge::{FrameMode, UdpSession, MAX_FRAME_PAYLOAD};
use crate::config::PoolConfig;
use crate::socks::{parse_udp_header, send_associate_reply};
use crate::transport::Tunnel;
use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::net::UdpSocket;
use tracing::{debug, error, info};

/// Relay pool for UDP ASSOCIATE sessions
#[derive(Debug)]
pub struct RelayPool<T: Tunnel> {
    tunnel: Arc<T>,
    config: PoolConfig,
    stats: Arc<PoolStats>,
}

impl<T: Tunnel> RelayPool<T> {
    /// Create a pool dialing through `tunnel`
    pub fn new(tunnel: Arc<T>, config: PoolConfig) -> Self {
        RelayPool {
            tunnel,
            config,
            stats: Arc::new(PoolStats::new()),
        }
    }

    /// Get pool statistics
    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run one relay session on `socket`
    ///
    /// Sends the UDP ASSOCIATE reply on `control`, then blocks until the first
    /// datagram arrives. Returns once every member has closed; `control` is
    /// held open until then.
    pub async fn run<C>(&self, socket: UdpSocket, mut control: C) -> Result<()>
    where
        C: AsyncWrite + Unpin + Send,
    {
        let port = socket
            .local_addr()
            .context("Failed to get relay socket address")?
            .port();

        send_associate_reply(&mut control, port)
            .await
            .context("Failed to send UDP ASSOCIATE reply")?;
        info!("UDP relay listening at {}", port);

        let socket = Arc::new(socket);
        let mut buf = vec![0u8; MAX_FRAME_PAYLOAD];
        let (n, src) = socket
            .recv_from(&mut buf)
            .await
            .context("Failed to read initial UDP packet")?;

        let (_, destination) =
            parse_udp_header(&buf[..n], true).context("Invalid initial UDP packet")?;
        info!("UDP destination {} for client {}", destination, src);

        let seed = Bytes::copy_from_slice(&buf[destination.size()..n]);
        let session = Arc::new(UdpSession::with_peer(destination, src));

        let members = self.spawn_members(socket, session, seed).await;
        self.supervise(&members).await;

        debug!("Closing UDP relay at {}", port);
        drop(control);
        Ok(())
    }

    /// Dial and start every member, in order
    ///
    /// A failed dial is logged and the member is marked closed; the remaining
    /// members are still attempted.
    async fn spawn_members(
        &self,
        socket: Arc<UdpSocket>,
        session: Arc<UdpSession>,
        seed: Bytes,
    ) -> Vec<Arc<AtomicBool>> {
        let fanout = self.config.fanout;
        let mut members = Vec::with_capacity(fanout);
        let mut seed = Some(seed);

        for id in 0..fanout {
            let mut member =
                PooledConnection::new(id, socket.clone(), session.clone(), FrameMode::Socks)
                    .with_stats(self.stats.clone());
            if let Some(payload) = seed.take() {
                member = member.with_seed(payload);
            }
            members.push(member.closed_handle());

            match self.tunnel.open(session.destination()).await {
                Ok(stream) => {
                    self.stats.record_dialed();
                    debug!("Pool member {} connected", id);
                    tokio::spawn(async move {
                        if let Err(e) = member.run(stream, None).await {
                            debug!("Pool member {} ended: {:#}", id, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Pool member {} failed to dial tunnel: {:#}", id, e);
                    self.stats.record_dial_failure();
                    member.close();
                }
            }
        }

        members
    }

    /// Poll member state until all have closed
    async fn supervise(&self, members: &[Arc<AtomicBool>]) {
        let mut interval = tokio::time::interval(self.config.poll_interval());

        loop {
            interval.tick().await;
            if members.iter().all(|closed| closed.load(Ordering::SeqCst)) {
                break;
            }
            self.stats.log_health();
        }
    }
}
