//! Main client structure
//!
//! Accepts local SOCKS5 connections until shutdown.

use super::session::handle_socks_connection;
use crate::config::ClientConfig;
use crate::pool::RelayPool;
use crate::transport::Tunnel;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Local SOCKS5 side of the bridge
pub struct Client<T: Tunnel> {
    /// Client configuration
    config: ClientConfig,
    /// Pool shared by every association
    pool: Arc<RelayPool<T>>,
}

impl<T: Tunnel> Client<T> {
    /// Create a new client dialing through `tunnel`
    pub fn new(config: ClientConfig, tunnel: T) -> Self {
        let pool = Arc::new(RelayPool::new(Arc::new(tunnel), config.pool.clone()));
        Client { config, pool }
    }

    /// Run the client until shutdown
    pub async fn run(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.listen_addr))?;
        self.run_with_listener(listener, shutdown_rx).await
    }

    /// Run the client on an already bound listener until shutdown
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        info!("Starting Sockbridge client");
        info!("SOCKS5 listening at {}", listener.local_addr()?);
        info!("Remote bridge: {}", self.config.remote_addr);
        info!("Pool fanout: {}", self.config.pool.fanout);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Failed to accept SOCKS5 connection: {}", e);
                            continue;
                        }
                    };
                    debug!("SOCKS5 connection from {}", peer);

                    let pool = self.pool.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_socks_connection(stream, pool).await {
                            error!("SOCKS5 session from {} failed: {:#}", peer, e);
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping client");
                    break;
                }
            }
        }

        info!("Client stopped");
        Ok(())
    }

    /// Get a reference to the relay pool
    pub fn pool(&self) -> &Arc<RelayPool<T>> {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
