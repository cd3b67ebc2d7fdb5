//! # Address
//!
//! Network addresses as the ban engine sees them: a concrete host or a CIDR
//! range, in either family. The variants are closed so that a v4 target can
//! never be compared against a v6 candidate by accident.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// IP family of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    V4,
    V6,
}

/// A ban target or a session address.
///
/// Stored and serialized in its textual form (`"203.0.113.5"`,
/// `"203.0.113.0/24"`). Prefer [`Address::host`] and [`Address::range`] over
/// the bare variants; [`matches`] still folds an IPv4-mapped `V6` or
/// `RangeV6` built by hand into its v4 form before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Address {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    RangeV4(Ipv4Net),
    RangeV6(Ipv6Net),
}

impl Address {
    /// Builds a host address. IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`)
    /// collapse to their IPv4 form so dual-stack sockets compare equal to
    /// plain v4 peers.
    pub fn host(ip: IpAddr) -> Self {
        match ip.to_canonical() {
            IpAddr::V4(v4) => Address::V4(v4),
            IpAddr::V6(v6) => Address::V6(v6),
        }
    }

    /// Builds a range address. Host bits below the prefix are cleared, and a
    /// range inside `::ffff:0:0/96` becomes the matching v4 range.
    pub fn range(net: IpNet) -> Self {
        match net.trunc() {
            IpNet::V4(v4) => Address::RangeV4(v4),
            IpNet::V6(v6) => match mapped_v4_range(&v6) {
                Some(v4) => Address::RangeV4(v4),
                None => Address::RangeV6(v6),
            },
        }
    }

    /// Same address with IPv4-mapped forms folded to v4.
    fn canonical(self) -> Self {
        match self {
            Address::V6(v6) => Address::host(IpAddr::V6(v6)),
            Address::RangeV6(v6) => Address::range(IpNet::V6(v6)),
            other => other,
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Address::V4(_) | Address::RangeV4(_) => Family::V4,
            Address::V6(_) | Address::RangeV6(_) => Family::V6,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Address::RangeV4(_) | Address::RangeV6(_))
    }

    /// The concrete IP for host addresses, `None` for ranges.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Address::V4(v4) => Some(IpAddr::V4(*v4)),
            Address::V6(v6) => Some(IpAddr::V6(*v6)),
            Address::RangeV4(_) | Address::RangeV6(_) => None,
        }
    }

    /// Shorthand for [`matches`] with `self` as the target.
    pub fn covers(&self, candidate: &Address) -> bool {
        matches(self, candidate)
    }
}

/// Decides whether `candidate` falls under the ban `target`.
///
/// A host target matches an equal host of the same family. A range target
/// matches any host of the same family inside its prefix. Ranges are never
/// candidates, and mismatched families never match.
pub fn matches(target: &Address, candidate: &Address) -> bool {
    match (target.canonical(), candidate.canonical()) {
        (Address::V4(t), Address::V4(c)) => t == c,
        (Address::V6(t), Address::V6(c)) => t == c,
        (Address::RangeV4(net), Address::V4(c)) => net.contains(&c),
        (Address::RangeV6(net), Address::V6(c)) => net.contains(&c),
        _ => false,
    }
}

/// The v4 range a `::ffff:a.b.c.d/n` range covers, for `n >= 96`.
fn mapped_v4_range(net: &Ipv6Net) -> Option<Ipv4Net> {
    let len = net.prefix_len().checked_sub(96)?;
    let v4 = net.network().to_ipv4_mapped()?;
    Ipv4Net::new(v4, len).ok()
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Address::host(ip)
    }
}

impl From<IpNet> for Address {
    fn from(net: IpNet) -> Self {
        Address::range(net)
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            s.parse::<IpNet>()
                .map(Address::range)
                .map_err(|e| DomainError::Validation(format!("invalid CIDR range '{s}': {e}")))
        } else {
            s.parse::<IpAddr>()
                .map(Address::host)
                .map_err(|e| DomainError::Validation(format!("invalid IP address '{s}': {e}")))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(v4) => write!(f, "{v4}"),
            Address::V6(v6) => write!(f, "{v6}"),
            Address::RangeV4(net) => write!(f, "{net}"),
            Address::RangeV6(net) => write!(f, "{net}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn exact_match_is_by_value_and_symmetric() {
        let a = addr("203.0.113.5");
        let b = Address::host("203.0.113.5".parse().unwrap());
        let c = addr("203.0.113.6");

        assert!(matches(&a, &b));
        assert!(matches(&b, &a));
        assert!(!matches(&a, &c));
        assert!(!matches(&c, &a));

        let v6a = addr("2001:db8::1");
        let v6b = addr("2001:db8:0:0::1");
        assert!(matches(&v6a, &v6b));
        assert!(matches(&v6b, &v6a));
    }

    #[test]
    fn range_contains_hosts_under_its_prefix() {
        let net = addr("203.0.113.0/24");
        assert!(matches(&net, &addr("203.0.113.0")));
        assert!(matches(&net, &addr("203.0.113.9")));
        assert!(matches(&net, &addr("203.0.113.255")));
        assert!(!matches(&net, &addr("203.0.114.1")));
        assert!(!matches(&net, &addr("198.51.100.1")));

        let net6 = addr("2001:db8::/32");
        assert!(matches(&net6, &addr("2001:db8:1::5")));
        assert!(!matches(&net6, &addr("2001:db9::5")));
    }

    #[test]
    fn families_never_cross() {
        assert!(!matches(&addr("0.0.0.0/0"), &addr("2001:db8::1")));
        assert!(!matches(&addr("::/0"), &addr("203.0.113.5")));
        assert!(!matches(&addr("203.0.113.5"), &addr("2001:db8::1")));
    }

    #[test]
    fn ranges_are_never_candidates() {
        let net = addr("10.0.0.0/8");
        assert!(!matches(&net, &addr("10.1.0.0/16")));
        assert!(!matches(&addr("10.0.0.1"), &net));
    }

    #[test]
    fn ipv4_mapped_ipv6_host_is_canonicalized() {
        let mapped = addr("::ffff:203.0.113.5");
        assert_eq!(mapped, addr("203.0.113.5"));
        assert_eq!(mapped.family(), Family::V4);
        assert!(matches(&addr("203.0.113.0/24"), &mapped));
    }

    #[test]
    fn ipv4_mapped_range_becomes_v4_range() {
        let mapped = addr("::ffff:203.0.113.0/120");
        assert_eq!(mapped, addr("203.0.113.0/24"));
        assert_eq!(mapped.family(), Family::V4);
        assert!(matches(&mapped, &addr("203.0.113.9")));
        assert!(matches(&mapped, &addr("::ffff:203.0.113.10")));
        assert!(!matches(&mapped, &addr("203.0.114.1")));

        let back: Address = serde_json::from_str("\"::ffff:198.51.100.0/120\"").unwrap();
        assert_eq!(back, addr("198.51.100.0/24"));

        // wider than the mapped block: stays v6
        assert_eq!(addr("::ffff:0:0/95").family(), Family::V6);
    }

    #[test]
    fn hand_built_mapped_variants_still_match_v4() {
        let raw_host = Address::V6("::ffff:203.0.113.5".parse().unwrap());
        assert!(matches(&addr("203.0.113.5"), &raw_host));
        assert!(matches(&addr("203.0.113.0/24"), &raw_host));

        let raw_range = Address::RangeV6("::ffff:203.0.113.0/120".parse().unwrap());
        assert!(matches(&raw_range, &addr("203.0.113.77")));
        assert!(!matches(&raw_range, &addr("2001:db8::1")));
    }

    #[test]
    fn range_host_bits_are_cleared() {
        let net = addr("203.0.113.77/24");
        assert_eq!(net.to_string(), "203.0.113.0/24");
        assert!(net.is_range());
        assert_eq!(net.ip(), None);
    }

    #[test]
    fn garbage_is_a_validation_error() {
        assert!(matches!(
            "not-an-ip".parse::<Address>(),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            "10.0.0.0/33".parse::<Address>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn serializes_as_text() {
        let json = serde_json::to_string(&addr("198.51.100.0/24")).unwrap();
        assert_eq!(json, "\"198.51.100.0/24\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr("198.51.100.0/24"));
    }
}
