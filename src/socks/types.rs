//! SOCKS5 address types
//!
//! Defines the endpoint carried in SOCKS5 UDP headers.

use super::consts::*;
use crate::error::Socks5Error;
use anyhow::{Context, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Host part of a SOCKS5 address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// Binary IPv4 or IPv6 address
    Ip(IpAddr),
    /// Domain name, resolved lazily
    Domain(String),
}

/// Endpoint carried in a SOCKS5 UDP header
///
/// Either an IP address or a domain name, never both, plus a port.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpAddr {
    host: Host,
    port: u16,
}

impl UdpAddr {
    /// Create an address from an IP and port
    pub fn ip(ip: IpAddr, port: u16) -> Self {
        UdpAddr {
            host: Host::Ip(ip),
            port,
        }
    }

    /// Create an address from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        Self::ip(IpAddr::V4(ip), port)
    }

    /// Create an address from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        Self::ip(IpAddr::V6(ip), port)
    }

    /// Create a domain address, rejecting names that do not fit the length byte
    pub fn domain(domain: impl Into<String>, port: u16) -> Result<Self, Socks5Error> {
        let domain = domain.into();
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(Socks5Error::InvalidDomain(format!(
                "{} bytes exceeds {}",
                domain.len(),
                MAX_DOMAIN_LEN
            )));
        }
        Ok(UdpAddr {
            host: Host::Domain(domain),
            port,
        })
    }

    /// Host part
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// IP address, if this is not a domain address
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.host {
            Host::Ip(ip) => Some(ip),
            Host::Domain(_) => None,
        }
    }

    /// Domain name, if this is not an IP address
    pub fn domain_name(&self) -> Option<&str> {
        match &self.host {
            Host::Domain(name) => Some(name),
            Host::Ip(_) => None,
        }
    }

    /// Port number
    pub fn port(&self) -> u16 {
        self.port
    }

    /// SOCKS5 address type byte
    pub fn addr_type(&self) -> u8 {
        match self.host {
            Host::Ip(IpAddr::V4(_)) => SOCKS5_ADDR_TYPE_IPV4,
            Host::Ip(IpAddr::V6(_)) => SOCKS5_ADDR_TYPE_IPV6,
            Host::Domain(_) => SOCKS5_ADDR_TYPE_DOMAIN,
        }
    }

    /// Length of the full header (prefix, type, address, port) on the wire
    pub fn size(&self) -> usize {
        let addr_len = match &self.host {
            Host::Ip(IpAddr::V4(_)) => 4,
            Host::Ip(IpAddr::V6(_)) => 16,
            Host::Domain(name) => 1 + name.len(),
        };
        HEADER_PREFIX_LEN + 1 + addr_len + 2
    }

    /// True for an unspecified IP with port 0 (`0.0.0.0:0` or `[::]:0`)
    pub fn is_all_zeros(&self) -> bool {
        match self.host {
            Host::Ip(ip) => ip.is_unspecified() && self.port == 0,
            Host::Domain(_) => false,
        }
    }

    /// Host rendered for use in `host:port` strings
    ///
    /// IPv6 addresses and domains containing ':' are bracketed.
    pub fn host_string(&self) -> String {
        match &self.host {
            Host::Ip(IpAddr::V4(ip)) => ip.to_string(),
            Host::Ip(IpAddr::V6(ip)) => format!("[{}]", ip),
            Host::Domain(name) if name.contains(':') && !name.starts_with('[') => {
                format!("[{}]", name)
            }
            Host::Domain(name) => name.clone(),
        }
    }

    /// Resolve the address to a SocketAddr
    ///
    /// For IP addresses, this returns immediately.
    /// For domain names, this performs DNS resolution.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        match &self.host {
            Host::Ip(ip) => Ok(SocketAddr::new(*ip, self.port)),
            Host::Domain(name) => {
                let resolved = tokio::net::lookup_host((name.as_str(), self.port))
                    .await
                    .with_context(|| format!("Failed to resolve domain: {}", name))?
                    .next()
                    .with_context(|| format!("No addresses found for domain: {}", name))?;
                Ok(resolved)
            }
        }
    }
}

impl fmt::Display for UdpAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host_string(), self.port)
    }
}

impl From<SocketAddr> for UdpAddr {
    fn from(addr: SocketAddr) -> Self {
        UdpAddr::ip(addr.ip(), addr.port())
    }
}
