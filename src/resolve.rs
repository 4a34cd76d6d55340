//! Backend address resolution.
//!
//! [`HostsManager`](crate::HostsManager) turns every backend address into an
//! IP before comparing it with the stored entry. The lookup is pluggable so
//! callers can swap in a test double or wrap it with their own timeout.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Maps a backend address (hostname or IP literal) to a single IP.
pub trait AddressResolver {
    /// Resolves `address`. May block on a DNS lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved.
    fn resolve(&self, address: &str) -> io::Result<IpAddr>;
}

impl<F> AddressResolver for F
where
    F: Fn(&str) -> io::Result<IpAddr>,
{
    fn resolve(&self, address: &str) -> io::Result<IpAddr> {
        self(address)
    }
}

/// Resolves through the operating system (`getaddrinfo`).
///
/// IPv4 results are preferred; the first IPv6 result is used only when no
/// IPv4 address exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, address: &str) -> io::Result<IpAddr> {
        if let Ok(ip) = address.parse::<IpAddr>() {
            return Ok(ip);
        }

        let mut first_v6 = None;
        for addr in (address, 0).to_socket_addrs()? {
            match addr.ip() {
                ip @ IpAddr::V4(_) => return Ok(ip),
                ip @ IpAddr::V6(_) => {
                    first_v6.get_or_insert(ip);
                }
            }
        }

        first_v6.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {address}"),
            )
        })
    }
}
