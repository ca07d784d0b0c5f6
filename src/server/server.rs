//! Main server structure
//!
//! Accepts tunnel connections until shutdown.

use super::flow::handle_tunnel;
use crate::config::ServerConfig;
use crate::transport::SocketOpts;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Far end of the bridge
pub struct Server {
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create a new server
    pub fn new(config: ServerConfig) -> Self {
        Server { config }
    }

    /// Run the server until shutdown
    pub async fn run(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.listen_addr))?;
        self.run_with_listener(listener, shutdown_rx).await
    }

    /// Run the server on an already bound listener until shutdown
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        info!("Starting Sockbridge server");
        info!("Tunnel listening at {}", listener.local_addr()?);

        let socket_opts = SocketOpts::from_tcp_config(&self.config.transport.tcp);
        let idle_timeout = self.idle_timeout();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Failed to accept tunnel connection: {}", e);
                            continue;
                        }
                    };
                    debug!("Tunnel connection from {}", peer);

                    if let Err(e) = socket_opts.apply(&stream) {
                        warn!("Failed to set socket options for {}: {}", peer, e);
                    }

                    tokio::spawn(async move {
                        if let Err(e) = handle_tunnel(stream, idle_timeout).await {
                            error!("Tunnel from {} failed: {:#}", peer, e);
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Idle timeout applied to every UDP flow
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.udp_idle_timeout)
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
