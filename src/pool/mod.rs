//! Relay pool module for Sockbridge
//!
//! This module fans one UDP association out over several tunnel connections.
//! Every member shares the association's UDP socket and session; each one
//! owns its tunnel stream and its reassembly state.

mod connection;
mod guard;
mod relay;
mod stats;

pub use connection::PooledConnection;
pub use guard::ClosedGuard;
pub use relay::RelayPool;
pub use stats::{PoolStats, PoolStatsSnapshot};
