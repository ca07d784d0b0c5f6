//! Server module for Sockbridge
//!
//! This module contains the far end of the tunnel: it accepts tunnel
//! connections, reads the destination preamble and relays frames to and
//! from the real UDP destination.

#[allow(clippy::module_inception)]
mod server;
mod flow;

pub use flow::handle_tunnel;
pub use server::Server;

use crate::config::ServerConfig;
use anyhow::Result;
use tokio::sync::broadcast;

/// Run the server with the given configuration
pub async fn run_server(
    config: ServerConfig,
    shutdown_rx: broadcast::Receiver<bool>,
) -> Result<()> {
    Server::new(config).run(shutdown_rx).await
}
