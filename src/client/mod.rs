//! Client module for Sockbridge
//!
//! This module contains the local SOCKS5 listener. Every UDP ASSOCIATE it
//! accepts is served by a relay pool dialing the remote bridge.

#[allow(clippy::module_inception)]
mod client;
mod session;

pub use client::Client;
pub use session::handle_socks_connection;

use crate::config::ClientConfig;
use crate::transport::{AddrMaybeCached, TcpTunnel};
use anyhow::Result;
use tokio::sync::broadcast;

/// Run the client with the given configuration
pub async fn run_client(
    config: ClientConfig,
    shutdown_rx: broadcast::Receiver<bool>,
) -> Result<()> {
    let tunnel = TcpTunnel::from_config(
        AddrMaybeCached::new(&config.remote_addr),
        &config.transport.tcp,
    );
    let client = Client::new(config, tunnel);
    client.run(shutdown_rx).await
}
