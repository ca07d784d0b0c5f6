//! SOCKS5 protocol constants
//!
//! Defines the constants used by the UDP ASSOCIATE header codec and the
//! local listener handshake.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// UDP ASSOCIATE command
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Header sizes
/// VER/CMD/RSV (request) or RSV/RSV/FRAG (datagram) prefix length
pub const HEADER_PREFIX_LEN: usize = 3;
/// Smallest possible header: prefix, type, zero-length domain, port
pub const MIN_HEADER_LEN: usize = HEADER_PREFIX_LEN + 1 + 1 + 2;
/// Maximum domain name length
pub const MAX_DOMAIN_LEN: usize = 255;
/// Largest possible header: prefix, type, length byte, domain, port
pub const MAX_HEADER_LEN: usize = HEADER_PREFIX_LEN + 1 + 1 + MAX_DOMAIN_LEN + 2;

/// UDP datagram header template for IPv4 destinations
pub const UDP_HEADER_IPV4: [u8; 10] = [0, 0, 0, SOCKS5_ADDR_TYPE_IPV4, 0, 0, 0, 0, 0, 0];
/// UDP datagram header template for IPv6 destinations
pub const UDP_HEADER_IPV6: [u8; 22] = [
    0,
    0,
    0,
    SOCKS5_ADDR_TYPE_IPV6,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
];

/// UDP ASSOCIATE success reply; the last two bytes carry the relay port
pub const UDP_ASSOCIATE_OK_REPLY: [u8; 10] = [
    SOCKS5_VERSION,
    0x00,
    SOCKS5_RESERVED,
    SOCKS5_ADDR_TYPE_IPV4,
    0,
    0,
    0,
    0,
    0,
    0,
];
