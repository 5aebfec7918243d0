//! Resolution and synthesis of addresses of a requested family

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

/// Address family requested from a [`Resolve`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

/// Resolves a host literal or name to an address of the requested family.
///
/// Returning `None` signals that no such address is available, callers treat this
/// as a local condition and leave the affected literal alone.
pub trait Resolve: Send + Sync + 'static {
    fn resolve(&self, host: &str, family: AddressFamily) -> Option<IpAddr>;
}

/// Only the first answer counts, and only if it is of the requested family
fn first_of_family(
    host: &str,
    family: AddressFamily,
    mut answers: impl Iterator<Item = IpAddr>,
) -> Option<IpAddr> {
    let first = answers.next()?;

    if AddressFamily::of(&first) == family {
        Some(first)
    } else {
        log::debug!("First address {first} for {host:?} is not of family {family:?}");
        None
    }
}

/// Uses the platform resolver (`getaddrinfo`), which performs NAT64 synthesis on
/// platforms where the system resolver does so.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        match (host, 0).to_socket_addrs() {
            Ok(addrs) => first_of_family(host, family, addrs.map(|addr| addr.ip())),
            Err(e) => {
                log::debug!("Failed to resolve {host:?}, {e}");
                None
            }
        }
    }
}

/// Fixed table of addresses
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer for `host`, answers are returned in insertion order
    pub fn insert(&mut self, host: impl Into<String>, addr: impl Into<IpAddr>) -> &mut Self {
        self.entries.entry(host.into()).or_default().push(addr.into());
        self
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        let answers = self.entries.get(host)?;

        first_of_family(host, family, answers.iter().copied())
    }
}

/// IPv6 /96 prefix used to embed IPv4 addresses
///
/// [RFC6052](https://www.rfc-editor.org/rfc/rfc6052.html#section-2.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nat64Prefix(Ipv6Addr);

/// Addresses the `ipv4only.arpa` name resolves to, see RFC 7050
const IPV4ONLY_ARPA: [Ipv4Addr; 2] = [Ipv4Addr::new(192, 0, 0, 170), Ipv4Addr::new(192, 0, 0, 171)];

impl Nat64Prefix {
    /// `64:ff9b::/96`
    pub const WELL_KNOWN: Self = Self(Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, 0));

    /// Create a prefix from the upper 96 bits of `prefix`
    pub fn new(prefix: Ipv6Addr) -> Self {
        Self(Ipv6Addr::from(u128::from(prefix) & !0xffff_ffff))
    }

    pub fn prefix(&self) -> Ipv6Addr {
        self.0
    }

    pub fn synthesize(&self, addr: Ipv4Addr) -> Ipv6Addr {
        Ipv6Addr::from(u128::from(self.0) | u128::from(u32::from(addr)))
    }

    /// Inverse of [`synthesize`](Self::synthesize), `None` if `addr` is outside the prefix
    pub fn extract(&self, addr: Ipv6Addr) -> Option<Ipv4Addr> {
        let bits = u128::from(addr);

        (bits & !0xffff_ffff == u128::from(self.0)).then(|| Ipv4Addr::from(bits as u32))
    }

    /// Find the prefix in the IPv6 answers to an `ipv4only.arpa` query
    pub fn from_ipv4only_answers(answers: impl IntoIterator<Item = IpAddr>) -> Option<Self> {
        answers.into_iter().find_map(|answer| match answer {
            IpAddr::V6(v6) => {
                let prefix = Self::new(v6);
                let embedded = prefix.extract(v6)?;

                IPV4ONLY_ARPA.contains(&embedded).then_some(prefix)
            }
            IpAddr::V4(_) => None,
        })
    }

    /// Discover the prefix of the local network by resolving `ipv4only.arpa`
    ///
    /// [RFC7050](https://www.rfc-editor.org/rfc/rfc7050.html)
    pub fn discover() -> io::Result<Option<Self>> {
        let answers = ("ipv4only.arpa", 0).to_socket_addrs()?;

        let prefix = Self::from_ipv4only_answers(answers.map(|addr| addr.ip()));

        log::debug!("Discovered NAT64 prefix {prefix:?}");

        Ok(prefix)
    }
}

impl Default for Nat64Prefix {
    fn default() -> Self {
        Self::WELL_KNOWN
    }
}

/// Synthesizes IPv6 addresses from IPv4 literals using a [`Nat64Prefix`],
/// host names are given to the wrapped resolver first.
#[derive(Debug, Default, Clone)]
pub struct Synthesizer<R = SystemResolver> {
    prefix: Nat64Prefix,
    resolver: R,
}

impl<R: Resolve> Synthesizer<R> {
    pub fn new(prefix: Nat64Prefix, resolver: R) -> Self {
        Self { prefix, resolver }
    }

    fn convert(&self, addr: IpAddr, family: AddressFamily) -> Option<IpAddr> {
        match (addr, family) {
            (IpAddr::V4(_), AddressFamily::V4) | (IpAddr::V6(_), AddressFamily::V6) => Some(addr),
            (IpAddr::V4(v4), AddressFamily::V6) => Some(IpAddr::V6(self.prefix.synthesize(v4))),
            (IpAddr::V6(v6), AddressFamily::V4) => self.prefix.extract(v6).map(IpAddr::V4),
        }
    }
}

impl<R: Resolve> Resolve for Synthesizer<R> {
    fn resolve(&self, host: &str, family: AddressFamily) -> Option<IpAddr> {
        if let Ok(addr) = host.parse::<IpAddr>() {
            return self.convert(addr, family);
        }

        let other = match family {
            AddressFamily::V4 => AddressFamily::V6,
            AddressFamily::V6 => AddressFamily::V4,
        };

        self.resolver.resolve(host, family).or_else(|| {
            let addr = self.resolver.resolve(host, other)?;
            self.convert(addr, family)
        })
    }
}
