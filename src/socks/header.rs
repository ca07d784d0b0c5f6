//! SOCKS5 address header codec
//!
//! Parses and serializes the address header shared by SOCKS5 requests and
//! UDP ASSOCIATE datagrams.
//!
//! ```text
//! +-----+-----+-----+------+----------+----------+
//! | B0  | B1  | B2  | ATYP | DST.ADDR | DST.PORT |
//! +-----+-----+-----+------+----------+----------+
//! |  1  |  1  |  1  |  1   | Variable |    2     |
//! +-----+-----+-----+------+----------+----------+
//! ```
//!
//! In a request B0..B2 are VER, CMD and RSV. In a UDP datagram they are
//! RSV, RSV and FRAG, so datagram parsing skips the version check.

use super::consts::*;
use super::types::UdpAddr;
use crate::error::{Result, Socks5Error};
use bytes::{Buf, BufMut, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Parse a header held entirely in `buf`
///
/// Returns the method byte (B1) and the decoded address; the header length is
/// available as [`UdpAddr::size`]. Bytes past the header are ignored.
pub fn parse_udp_header(buf: &[u8], skip_check: bool) -> Result<(u8, UdpAddr)> {
    if buf.len() < MIN_HEADER_LEN {
        return Err(Socks5Error::ShortBuffer {
            needed: MIN_HEADER_LEN,
            available: buf.len(),
        }
        .into());
    }

    check_prefix(buf, skip_check)?;

    let size = header_size(buf)?;
    if buf.len() < size {
        return Err(Socks5Error::ShortBuffer {
            needed: size,
            available: buf.len(),
        }
        .into());
    }

    Ok((buf[1], decode_address(&buf[..size])?))
}

/// Read exactly one header from a live stream
///
/// Reads the smallest possible header first, then whatever the address type
/// declares. Never consumes bytes past the header.
pub async fn read_udp_header<R>(reader: &mut R, skip_check: bool) -> Result<(u8, UdpAddr)>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_HEADER_LEN];
    reader.read_exact(&mut buf[..MIN_HEADER_LEN]).await?;

    check_prefix(&buf, skip_check)?;

    let size = header_size(&buf)?;
    reader.read_exact(&mut buf[MIN_HEADER_LEN..size]).await?;

    tracing::trace!("Read {}-byte SOCKS5 header", size);

    Ok((buf[1], decode_address(&buf[..size])?))
}

/// Append a UDP datagram header (`RSV RSV FRAG ATYP ADDR PORT`) for `addr`
pub fn put_udp_header(buf: &mut BytesMut, addr: &UdpAddr) {
    match addr.ip_addr() {
        Some(IpAddr::V4(ip)) => {
            let mut header = UDP_HEADER_IPV4;
            header[4..8].copy_from_slice(&ip.octets());
            header[8..].copy_from_slice(&addr.port().to_be_bytes());
            buf.put_slice(&header);
        }
        Some(IpAddr::V6(ip)) => {
            let mut header = UDP_HEADER_IPV6;
            header[4..20].copy_from_slice(&ip.octets());
            header[20..].copy_from_slice(&addr.port().to_be_bytes());
            buf.put_slice(&header);
        }
        None => {
            buf.put_slice(&[0, 0, 0]);
            put_address(buf, addr);
        }
    }
}

/// Append a request header (`VER CMD RSV ATYP ADDR PORT`) for `addr`
pub fn put_request_header(buf: &mut BytesMut, cmd: u8, addr: &UdpAddr) {
    buf.put_slice(&[SOCKS5_VERSION, cmd, SOCKS5_RESERVED]);
    put_address(buf, addr);
}

/// Build a complete UDP datagram: header for `addr` followed by `payload`
pub fn encode_udp_packet(addr: &UdpAddr, payload: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(addr.size() + payload.len());
    put_udp_header(&mut buf, addr);
    buf.put_slice(payload);
    buf
}

fn put_address(buf: &mut BytesMut, addr: &UdpAddr) {
    buf.put_u8(addr.addr_type());
    match addr.ip_addr() {
        Some(IpAddr::V4(ip)) => buf.put_slice(&ip.octets()),
        Some(IpAddr::V6(ip)) => buf.put_slice(&ip.octets()),
        None => {
            // Length is bounded by UdpAddr::domain
            let name = addr.domain_name().unwrap_or_default();
            buf.put_u8(name.len() as u8);
            buf.put_slice(name.as_bytes());
        }
    }
    buf.put_u16(addr.port());
}

fn check_prefix(buf: &[u8], skip_check: bool) -> Result<()> {
    if skip_check {
        return Ok(());
    }
    if buf[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(buf[0]).into());
    }
    if buf[1] != SOCKS5_CMD_TCP_CONNECT && buf[1] != SOCKS5_CMD_UDP_ASSOCIATE {
        return Err(Socks5Error::CommandNotSupported(buf[1]).into());
    }
    Ok(())
}

/// Header length declared by the type byte; needs at least MIN_HEADER_LEN bytes
fn header_size(buf: &[u8]) -> Result<usize> {
    match buf[3] {
        SOCKS5_ADDR_TYPE_IPV4 => Ok(HEADER_PREFIX_LEN + 1 + 4 + 2),
        SOCKS5_ADDR_TYPE_IPV6 => Ok(HEADER_PREFIX_LEN + 1 + 16 + 2),
        SOCKS5_ADDR_TYPE_DOMAIN => Ok(HEADER_PREFIX_LEN + 1 + 1 + buf[4] as usize + 2),
        atyp => Err(Socks5Error::AddressTypeNotSupported(atyp).into()),
    }
}

/// Decode the address from a slice holding exactly one header
fn decode_address(header: &[u8]) -> Result<UdpAddr> {
    let size = header.len();
    let port = (&header[size - 2..]).get_u16();
    let raw = &header[HEADER_PREFIX_LEN + 1..size - 2];

    match header[3] {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(raw);
            Ok(UdpAddr::ipv4(Ipv4Addr::from(octets), port))
        }
        SOCKS5_ADDR_TYPE_IPV6 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(raw);
            Ok(UdpAddr::ipv6(Ipv6Addr::from(octets), port))
        }
        _ => {
            let name = std::str::from_utf8(&raw[1..])
                .map_err(|e| Socks5Error::InvalidDomain(e.to_string()))?;
            Ok(UdpAddr::domain(name, port)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use std::io::Cursor;

    fn request_bytes(cmd: u8, addr: &UdpAddr) -> Vec<u8> {
        let mut buf = BytesMut::new();
        put_request_header(&mut buf, cmd, addr);
        buf.to_vec()
    }

    #[test]
    fn test_parse_ipv4_datagram_header() {
        let mut data = vec![0, 0, 0, SOCKS5_ADDR_TYPE_IPV4, 1, 2, 3, 4, 0, 53];
        data.extend_from_slice(b"PING");

        let (_, addr) = parse_udp_header(&data, true).unwrap();
        assert_eq!(addr.ip_addr(), Some(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))));
        assert_eq!(addr.port(), 53);
        assert_eq!(addr.size(), 10);
        assert_eq!(&data[addr.size()..], b"PING");
    }

    #[test]
    fn test_header_round_trip_all_families() {
        let addrs = [
            UdpAddr::ipv4(Ipv4Addr::new(10, 0, 0, 1), 80),
            UdpAddr::ipv6("2001:db8::1".parse().unwrap(), 5353),
            UdpAddr::domain("dns.example.org", 853).unwrap(),
        ];

        for addr in addrs {
            let encoded = encode_udp_packet(&addr, &[]);
            assert_eq!(encoded.len(), addr.size());

            let (_, parsed) = parse_udp_header(&encoded, true).unwrap();
            assert_eq!(parsed, addr);
            assert_eq!(parsed.size(), addr.size());
        }
    }

    #[test]
    fn test_put_udp_header_domain_layout() {
        let addr = UdpAddr::domain("test.com", 443).unwrap();
        let mut buf = BytesMut::new();
        put_udp_header(&mut buf, &addr);

        assert_eq!(&buf[..3], &[0, 0, 0]);
        assert_eq!(buf[3], SOCKS5_ADDR_TYPE_DOMAIN);
        assert_eq!(buf[4], 8);
        assert_eq!(&buf[5..13], b"test.com");
        assert_eq!(&buf[13..], &443u16.to_be_bytes());
    }

    #[test]
    fn test_put_udp_header_ipv6_layout() {
        let addr = UdpAddr::ipv6(Ipv6Addr::LOCALHOST, 8053);
        let mut buf = BytesMut::new();
        put_udp_header(&mut buf, &addr);

        assert_eq!(buf.len(), 22);
        assert_eq!(buf[3], SOCKS5_ADDR_TYPE_IPV6);
        assert_eq!(&buf[4..20], &Ipv6Addr::LOCALHOST.octets());
        assert_eq!(&buf[20..], &8053u16.to_be_bytes());
    }

    #[test]
    fn test_parse_checks_version_and_command() {
        let addr = UdpAddr::ipv4(Ipv4Addr::LOCALHOST, 1);

        let mut data = request_bytes(SOCKS5_CMD_UDP_ASSOCIATE, &addr);
        let (method, _) = parse_udp_header(&data, false).unwrap();
        assert_eq!(method, SOCKS5_CMD_UDP_ASSOCIATE);

        data[0] = 4;
        assert!(matches!(
            parse_udp_header(&data, false),
            Err(BridgeError::Socks5(Socks5Error::UnsupportedVersion(4)))
        ));
        assert!(parse_udp_header(&data, true).is_ok());

        let mut data = request_bytes(0x02, &addr);
        assert!(matches!(
            parse_udp_header(&data, false),
            Err(BridgeError::Socks5(Socks5Error::CommandNotSupported(2)))
        ));
        data[1] = SOCKS5_CMD_TCP_CONNECT;
        assert!(parse_udp_header(&data, false).is_ok());
    }

    #[test]
    fn test_parse_rejects_unknown_address_type() {
        let data = [0, 0, 0, 0x02, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            parse_udp_header(&data, true),
            Err(BridgeError::Socks5(Socks5Error::AddressTypeNotSupported(2)))
        ));
    }

    #[test]
    fn test_parse_short_buffer() {
        // IPv6 header truncated after the address
        let data = [0, 0, 0, SOCKS5_ADDR_TYPE_IPV6, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            parse_udp_header(&data, true),
            Err(BridgeError::Socks5(Socks5Error::ShortBuffer {
                needed: 22,
                available: 12
            }))
        ));

        // Domain declares 10 bytes but carries 2
        let data = [0, 0, 0, SOCKS5_ADDR_TYPE_DOMAIN, 10, b'a', b'b', 0, 53];
        assert!(matches!(
            parse_udp_header(&data, true),
            Err(BridgeError::Socks5(Socks5Error::ShortBuffer { needed: 17, .. }))
        ));

        assert!(matches!(
            parse_udp_header(&[0, 0, 0], true),
            Err(BridgeError::Socks5(Socks5Error::ShortBuffer { .. }))
        ));
    }

    #[test]
    fn test_parse_empty_domain() {
        let data = [0, 0, 0, SOCKS5_ADDR_TYPE_DOMAIN, 0, 0x1F, 0x90];
        let (_, addr) = parse_udp_header(&data, true).unwrap();
        assert_eq!(addr.domain_name(), Some(""));
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.size(), 7);
    }

    #[test]
    fn test_parse_invalid_utf8_domain() {
        let data = [0, 0, 0, SOCKS5_ADDR_TYPE_DOMAIN, 2, 0xFF, 0xFE, 0, 53];
        assert!(matches!(
            parse_udp_header(&data, true),
            Err(BridgeError::Socks5(Socks5Error::InvalidDomain(_)))
        ));
    }

    #[tokio::test]
    async fn test_read_header_stops_at_header_end() {
        let addr = UdpAddr::domain("example.com", 443).unwrap();
        let mut data = request_bytes(SOCKS5_CMD_UDP_ASSOCIATE, &addr);
        data.extend_from_slice(b"trailing");

        let mut reader = Cursor::new(data);
        let (method, parsed) = read_udp_header(&mut reader, false).await.unwrap();

        assert_eq!(method, SOCKS5_CMD_UDP_ASSOCIATE);
        assert_eq!(parsed, addr);
        assert_eq!(reader.position() as usize, addr.size());
    }

    #[tokio::test]
    async fn test_read_header_ipv4() {
        let addr = UdpAddr::ipv4(Ipv4Addr::new(1, 2, 3, 4), 53);
        let mut reader = Cursor::new(request_bytes(SOCKS5_CMD_TCP_CONNECT, &addr));

        let (method, parsed) = read_udp_header(&mut reader, false).await.unwrap();
        assert_eq!(method, SOCKS5_CMD_TCP_CONNECT);
        assert_eq!(parsed, addr);
    }

    #[tokio::test]
    async fn test_read_header_truncated_stream() {
        let data = vec![SOCKS5_VERSION, SOCKS5_CMD_UDP_ASSOCIATE, 0, SOCKS5_ADDR_TYPE_IPV6, 0, 0, 0];
        let mut reader = Cursor::new(data);
        assert!(matches!(
            read_udp_header(&mut reader, false).await,
            Err(BridgeError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_read_header_bad_version() {
        let mut reader = Cursor::new(vec![4, 1, 0, SOCKS5_ADDR_TYPE_IPV4, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            read_udp_header(&mut reader, false).await,
            Err(BridgeError::Socks5(Socks5Error::UnsupportedVersion(4)))
        ));
    }
}
