//! SOCKS5 module for Sockbridge
//!
//! This module implements the parts of SOCKS5 the relay needs: the address
//! header shared by requests and UDP ASSOCIATE datagrams, the replies sent on
//! the control connection, and a minimal handshake for the local listener.

mod consts;
mod handshake;
mod header;
mod reply;
mod types;

pub use consts::*;
pub use handshake::{negotiate, read_request};
pub use header::{
    encode_udp_packet, parse_udp_header, put_request_header, put_udp_header, read_udp_header,
};
pub use reply::{associate_reply, send_associate_reply, send_reply};
pub use types::{Host, UdpAddr};
