//! UDP/stream bridge
//!
//! Converts UDP datagrams into length-prefixed frames for a tunnel stream and
//! back again.
//!
//! # Frame Format
//!
//! ```text
//! +--------+-----------+
//! | Length |  Payload  |
//! +--------+-----------+
//! |   2B   |  Length   |
//! +--------+-----------+
//! ```
//!
//! The length is big-endian. In SOCKS mode the payload read from the client
//! has its SOCKS5 header stripped, and payloads written back to the client
//! are wrapped in a header for the session destination. Raw mode passes
//! datagrams through untouched.

mod assembler;
mod reader;
mod session;
mod writer;

pub use assembler::{FrameAssembler, ReassemblyState};
pub use reader::FrameReader;
pub use session::UdpSession;
pub use writer::FrameWriter;

/// Length prefix size
pub const FRAME_HEADER_LEN: usize = 2;

/// Largest payload a frame can carry
pub const MAX_FRAME_PAYLOAD: usize = u16::MAX as usize;

/// Smallest buffer [`FrameReader::read`] accepts
pub const MIN_READ_BUFFER: usize = MAX_FRAME_PAYLOAD + FRAME_HEADER_LEN;

/// How datagrams are framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Datagrams carry SOCKS5 UDP headers on the local side
    Socks,
    /// Datagrams are forwarded as-is
    Raw,
}
