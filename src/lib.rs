//! # Sockbridge - SOCKS5 UDP Relay Bridge
//!
//! Sockbridge carries SOCKS5 UDP ASSOCIATE traffic across a stream tunnel.
//! The local side speaks SOCKS5 to applications; the far side sends plain
//! datagrams to the real destination.
//!
//! ## Features
//!
//! - **UDP ASSOCIATE**: A local SOCKS5 listener serving UDP associations
//! - **Fan-out**: Each association is spread over several tunnel connections
//!   sharing one UDP socket
//! - **Framing**: Datagrams travel as 2-byte length-prefixed frames that
//!   survive arbitrary stream fragmentation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockbridge::config::load_config;
//! use sockbridge::client::run_client;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     if let Some(client) = config.client {
//!         run_client(client, shutdown_rx).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! App -UDP/SOCKS5-> client (RelayPool) =N tunnels=> server -UDP-> Target
//! ```
//!
//! Every tunnel starts with a SOCKS5-style preamble naming the destination,
//! followed by frames in both directions.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod pool;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use bridge::{FrameReader, FrameWriter, UdpSession};
pub use client::run_client;
pub use config::{load_config, Config};
pub use error::{BridgeError, Socks5Error};
pub use pool::RelayPool;
pub use server::run_server;
pub use socks::UdpAddr;

/// Version of the Sockbridge library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
