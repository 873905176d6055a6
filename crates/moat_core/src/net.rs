use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;

use crate::{StoreError, StoreResult};

/// A CIDR network. Parsing canonicalizes the address to the network address
/// (host bits cleared), so two prefixes naming the same network compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    network: IpNetwork,
    addr: String,
    prefix_len: u8,
}

impl Prefix {
    /// Parse a CIDR literal such as `192.0.2.0/24` or `2001:db8::/32`. A
    /// bare address without an explicit prefix length is rejected.
    pub fn parse(literal: &str) -> StoreResult<Self> {
        let Some((addr, len)) = literal.split_once('/') else {
            return Err(StoreError::invalid_prefix(literal));
        };
        let prefix_len: u8 = len
            .parse()
            .map_err(|_| StoreError::invalid_prefix(literal))?;
        Self::from_parts(addr, prefix_len)
    }

    /// Rebuild a prefix from its stored columns.
    pub fn from_parts(addr: &str, prefix_len: u8) -> StoreResult<Self> {
        let ip: IpAddr = addr
            .parse()
            .map_err(|_| StoreError::invalid_prefix(format!("{addr}/{prefix_len}")))?;
        let network_addr = match ip {
            IpAddr::V4(v4) => {
                if prefix_len > 32 {
                    return Err(StoreError::invalid_prefix(format!("{addr}/{prefix_len}")));
                }
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & v4_mask(prefix_len)))
            }
            IpAddr::V6(v6) => {
                if prefix_len > 128 {
                    return Err(StoreError::invalid_prefix(format!("{addr}/{prefix_len}")));
                }
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & v6_mask(prefix_len)))
            }
        };
        let network = IpNetwork::new(network_addr, prefix_len)
            .map_err(|_| StoreError::invalid_prefix(format!("{addr}/{prefix_len}")))?;
        Ok(Self {
            addr: network_addr.to_string(),
            prefix_len,
            network,
        })
    }

    /// Batch constructor: invalid literals are skipped with a warning so a
    /// partially valid list still yields the valid subset.
    pub fn parse_all(literals: &[String]) -> Vec<Self> {
        let mut prefixes = Vec::with_capacity(literals.len());
        for literal in literals {
            match Self::parse(literal) {
                Ok(prefix) => prefixes.push(prefix),
                Err(_) => log::warn!("skipping invalid prefix literal: {literal}"),
            }
        }
        prefixes
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The network address (host bits cleared).
    pub fn first_address(&self) -> IpAddr {
        self.network.ip()
    }

    /// The last address of the network (all host bits set), computed over the
    /// address's own byte width for both IPv4 and IPv6.
    pub fn last_address(&self) -> IpAddr {
        match self.network.ip() {
            IpAddr::V4(v4) => {
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) | !v4_mask(self.prefix_len)))
            }
            IpAddr::V6(v6) => {
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) | !v6_mask(self.prefix_len)))
            }
        }
    }

    /// Containment test against the other prefix's declared network: true iff
    /// both its first and last address fall inside this network.
    pub fn includes(&self, other: &Prefix) -> bool {
        self.contains(other.first_address()) && self.contains(other.last_address())
    }

    /// True iff the parsed address falls within this network. Unparseable
    /// addresses are not contained.
    pub fn validate(&self, addr: &str) -> bool {
        match addr.parse::<IpAddr>() {
            Ok(ip) => self.contains(ip),
            Err(_) => false,
        }
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self.network.ip(), ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                u32::from(ip) & v4_mask(self.prefix_len) == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                u128::from(ip) & v6_mask(self.prefix_len) == u128::from(net)
            }
            _ => false,
        }
    }

    pub fn is_multicast(&self) -> bool {
        self.network.ip().is_multicast()
    }

    pub fn is_loopback(&self) -> bool {
        self.network.ip().is_loopback()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        !0u32 << (32 - u32::from(prefix_len))
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        !0u128 << (128 - u32::from(prefix_len))
    }
}

/// An inclusive port interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortRange {
    lower_port: u16,
    upper_port: u16,
}

impl PortRange {
    pub fn new(lower_port: u16, upper_port: u16) -> StoreResult<Self> {
        if lower_port > upper_port {
            return Err(StoreError::invalid(format!(
                "port range lower bound {lower_port} exceeds upper bound {upper_port}"
            )));
        }
        Ok(Self {
            lower_port,
            upper_port,
        })
    }

    pub fn lower_port(&self) -> u16 {
        self.lower_port
    }

    pub fn upper_port(&self) -> u16 {
        self.upper_port
    }

    pub fn includes(&self, port: u16) -> bool {
        self.lower_port <= port && port <= self.upper_port
    }
}

#[cfg(test)]
mod tests {
    use super::{PortRange, Prefix};

    #[test]
    fn parse_canonicalizes_to_network_address() {
        let prefix = Prefix::parse("10.10.10.1/24").expect("prefix");
        assert_eq!(prefix.to_string(), "10.10.10.0/24");
        assert_eq!(prefix.addr(), "10.10.10.0");
        assert_eq!(prefix.prefix_len(), 24);
    }

    #[test]
    fn parse_rejects_invalid_literals() {
        assert!(Prefix::parse("not-a-prefix").is_err());
        assert!(Prefix::parse("10.0.0.0/33").is_err());
        assert!(Prefix::parse("10.0.0.0").is_err());
    }

    #[test]
    fn parse_requires_an_explicit_prefix_length() {
        assert!(Prefix::parse("10.0.0.0").is_err());
        assert!(Prefix::parse("2001:db8::").is_err());
        assert!(Prefix::parse("10.0.0.0/").is_err());
        assert!(Prefix::parse("10.0.0.0/abc").is_err());
    }

    #[test]
    fn includes_is_reflexive() {
        let a = Prefix::parse("10.10.10.1/24").expect("prefix");
        let b = Prefix::parse("10.10.10.1/24").expect("prefix");
        assert!(a.includes(&b));
    }

    #[test]
    fn includes_rejects_disjoint_networks() {
        let a = Prefix::parse("10.10.10.0/24").expect("prefix");
        let b = Prefix::parse("10.10.11.0/24").expect("prefix");
        assert!(!a.includes(&b));
        assert!(!b.includes(&a));
    }

    #[test]
    fn includes_narrower_network() {
        let wide = Prefix::parse("10.10.0.0/16").expect("prefix");
        let narrow = Prefix::parse("10.10.4.0/24").expect("prefix");
        assert!(wide.includes(&narrow));
        assert!(!narrow.includes(&wide));
    }

    #[test]
    fn last_address_sets_all_host_bits() {
        let v4 = Prefix::parse("192.0.2.0/24").expect("prefix");
        assert_eq!(v4.last_address().to_string(), "192.0.2.255");
        let v6 = Prefix::parse("2001:db8::/32").expect("prefix");
        assert_eq!(
            v6.last_address().to_string(),
            "2001:db8:ffff:ffff:ffff:ffff:ffff:ffff"
        );
    }

    #[test]
    fn validate_checks_membership() {
        let prefix = Prefix::parse("192.0.2.0/24").expect("prefix");
        assert!(prefix.validate("192.0.2.77"));
        assert!(!prefix.validate("192.0.3.1"));
        assert!(!prefix.validate("bogus"));
    }

    #[test]
    fn families_do_not_mix() {
        let v4 = Prefix::parse("0.0.0.0/0").expect("prefix");
        let v6 = Prefix::parse("::/0").expect("prefix");
        assert!(!v4.includes(&v6));
        assert!(!v4.validate("2001:db8::1"));
    }

    #[test]
    fn parse_all_skips_invalid_entries() {
        let literals = vec![
            "10.0.0.0/8".to_string(),
            "garbage".to_string(),
            "192.0.2.0/24".to_string(),
        ];
        let prefixes = Prefix::parse_all(&literals);
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[0].to_string(), "10.0.0.0/8");
        assert_eq!(prefixes[1].to_string(), "192.0.2.0/24");
    }

    #[test]
    fn port_range_enforces_ordering() {
        let range = PortRange::new(80, 443).expect("range");
        assert!(range.includes(80));
        assert!(range.includes(443));
        assert!(!range.includes(8080));
        assert!(PortRange::new(443, 80).is_err());
    }
}
