//! Pooled connection
//!
//! One tunnel stream paired with a frame reader and a frame writer over the
//! shared UDP socket. Datagrams become frames sent upstream; frames arriving
//! from upstream become datagrams.

use super::guard::ClosedGuard;
use super::stats::PoolStats;
use crate::bridge::{FrameMode, FrameReader, FrameWriter, UdpSession, MIN_READ_BUFFER};
use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UdpSocket;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Read size for upstream tunnel bytes
const STREAM_CHUNK_SIZE: usize = 16 * 1024;

/// A pool member bridging the shared UDP socket and one tunnel stream
#[derive(Debug)]
pub struct PooledConnection {
    id: usize,
    reader: FrameReader,
    writer: FrameWriter,
    closed: Arc<AtomicBool>,
    stats: Option<Arc<PoolStats>>,
}

impl PooledConnection {
    /// Create a member over `socket` for `session`
    pub fn new(id: usize, socket: Arc<UdpSocket>, session: Arc<UdpSession>, mode: FrameMode) -> Self {
        PooledConnection {
            id,
            reader: FrameReader::new(socket.clone(), session.clone(), mode),
            writer: FrameWriter::new(socket, session, mode),
            closed: Arc::new(AtomicBool::new(false)),
            stats: None,
        }
    }

    /// Serve `payload` upstream before reading from the socket
    pub fn with_seed(mut self, payload: Bytes) -> Self {
        self.reader = self.reader.with_seed(payload);
        self
    }

    /// Record the member's closure in `stats`
    pub fn with_stats(mut self, stats: Arc<PoolStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Member index within its pool
    pub fn id(&self) -> usize {
        self.id
    }

    /// Shared handle to the closed flag, for supervision
    pub fn closed_handle(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    /// Whether the member has terminated
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark the member closed without running it
    pub fn close(&self) {
        drop(self.guard());
    }

    fn guard(&self) -> ClosedGuard {
        let guard = ClosedGuard::new(self.closed.clone());
        match &self.stats {
            Some(stats) => guard.with_stats(stats.clone()),
            None => guard,
        }
    }

    /// Pump datagrams and frames between the socket and `stream` until the
    /// stream ends, an I/O error occurs or `idle_timeout` elapses without
    /// traffic in either direction
    ///
    /// Both directions run concurrently, so a stalled sink on one side never
    /// stops the other side from draining. The member is marked closed when
    /// this returns.
    pub async fn run<S>(mut self, stream: S, idle_timeout: Option<Duration>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let _guard = self.guard();
        let id = self.id;

        let (mut upstream_rd, mut upstream_wr) = tokio::io::split(stream);
        let activity = Notify::new();

        debug!("Pool member {} started", id);

        let result = tokio::select! {
            r = pump_uplink(id, &mut self.reader, &mut upstream_wr, &activity) => r,
            r = pump_downlink(id, &mut upstream_rd, &mut self.writer, &activity) => r,
            _ = watch_idle(id, idle_timeout, &activity) => Ok(()),
        };

        let _ = upstream_wr.shutdown().await;
        debug!("Pool member {} stopped", id);
        result
    }
}

/// Datagrams from the socket, as frames, into the tunnel
async fn pump_uplink<W>(
    id: usize,
    reader: &mut FrameReader,
    upstream: &mut W,
    activity: &Notify,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame_buf = vec![0u8; MIN_READ_BUFFER];

    loop {
        let n = match reader.read(&mut frame_buf).await {
            Ok(n) => n,
            Err(e) if e.is_protocol() => {
                warn!("Pool member {} skipped datagram: {}", id, e);
                continue;
            }
            Err(e) => return Err(e).context("Failed to read from UDP socket"),
        };

        upstream
            .write_all(&frame_buf[..n])
            .await
            .context("Failed to write frame to tunnel")?;
        activity.notify_one();
    }
}

/// Tunnel bytes, reassembled into frames, out as datagrams
async fn pump_downlink<R>(
    id: usize,
    upstream: &mut R,
    writer: &mut FrameWriter,
    activity: &Notify,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; STREAM_CHUNK_SIZE];

    loop {
        let n = upstream
            .read(&mut chunk)
            .await
            .context("Failed to read from tunnel")?;
        if n == 0 {
            debug!("Pool member {} tunnel closed", id);
            return Ok(());
        }

        writer
            .write(&chunk[..n])
            .await
            .context("Failed to send datagram")?;
        activity.notify_one();
    }
}

/// Resolve once `idle_timeout` passes without activity; never without a timeout
async fn watch_idle(id: usize, idle_timeout: Option<Duration>, activity: &Notify) {
    let Some(timeout) = idle_timeout else {
        return std::future::pending().await;
    };

    while tokio::time::timeout(timeout, activity.notified())
        .await
        .is_ok()
    {}

    debug!("Pool member {} idle, closing", id);
}
