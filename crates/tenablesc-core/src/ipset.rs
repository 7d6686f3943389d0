//! Canonical IP sets parsed from Tenable's lenient list format

use crate::error::{Error, Result};
use ipnetwork::IpNetwork;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

/// Address family of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Family {
    V4,
    V6,
}

/// Closed interval of addresses within one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Interval {
    family: Family,
    start: u128,
    end: u128,
}

impl Interval {
    fn single(ip: IpAddr) -> Self {
        let (family, n) = to_u128(ip);
        Interval {
            family,
            start: n,
            end: n,
        }
    }

    fn bound(&self, n: u128) -> IpAddr {
        match self.family {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(n as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(n)),
        }
    }
}

fn to_u128(ip: IpAddr) -> (Family, u128) {
    match ip {
        IpAddr::V4(v4) => (Family::V4, u128::from(u32::from(v4))),
        IpAddr::V6(v6) => (Family::V6, u128::from(v6)),
    }
}

/// An IP address range (e.g., 192.168.1.1-192.168.1.254)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    pub start: IpAddr,
    pub end: IpAddr,
}

impl IpRange {
    /// Create a new IP range; both ends must share a family and be ordered
    pub fn new(start: IpAddr, end: IpAddr) -> Result<Self> {
        let (start_family, s) = to_u128(start);
        let (end_family, e) = to_u128(end);
        if start_family != end_family {
            return Err(Error::Parse(format!(
                "range {}-{} mixes address families",
                start, end
            )));
        }
        if s > e {
            return Err(Error::Parse(format!(
                "range {}-{} has start after end",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `a-b` notation
    pub fn parse(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| Error::Parse(format!("{} is not an IP range", s)))?;
        let start: IpAddr = start
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("{} is not an IP range", s)))?;
        let end: IpAddr = end
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("{} is not an IP range", s)))?;
        Self::new(start, end)
    }

    fn interval(&self) -> Interval {
        let (family, start) = to_u128(self.start);
        let (_, end) = to_u128(self.end);
        Interval { family, start, end }
    }
}

impl std::fmt::Display for IpRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Accumulates addresses, ranges and prefixes into an [`IpSet`]
#[derive(Debug, Clone, Default)]
pub struct IpSetBuilder {
    intervals: Vec<Interval>,
}

impl IpSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ip(&mut self, ip: IpAddr) {
        self.intervals.push(Interval::single(ip));
    }

    pub fn add_range(&mut self, range: IpRange) {
        self.intervals.push(range.interval());
    }

    pub fn add_prefix(&mut self, net: IpNetwork) {
        let (family, addr) = to_u128(net.ip());
        let bits: u32 = match family {
            Family::V4 => 32,
            Family::V6 => 128,
        };
        let host_bits = bits - u32::from(net.prefix());
        let host_mask: u128 = if host_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        let start = addr & !host_mask;
        self.intervals.push(Interval {
            family,
            start,
            end: start | host_mask,
        });
    }

    /// Sort and merge overlapping or adjacent intervals
    pub fn build(mut self) -> IpSet {
        self.intervals.sort();
        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for iv in self.intervals {
            match merged.last_mut() {
                Some(last) if last.family == iv.family && iv.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(iv.end);
                }
                _ => merged.push(iv),
            }
        }
        IpSet { intervals: merged }
    }
}

fn tenable_delimiter() -> &'static Regex {
    static DELIM: OnceLock<Regex> = OnceLock::new();
    DELIM.get_or_init(|| Regex::new(r#"[",\n]"#).expect("static delimiter pattern"))
}

/// A normalized set of IP addresses
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IpSet {
    intervals: Vec<Interval>,
}

impl IpSet {
    /// Parse a Tenable IP list.
    ///
    /// Tokens are separated by commas, quotes or newlines. Each non-empty token is read as
    /// an address, then a range, then a CIDR prefix; anything else fails the whole parse.
    pub fn parse_tenable(list: &str) -> Result<Self> {
        let mut builder = IpSetBuilder::new();

        for token in tenable_delimiter().split(list) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if let Ok(ip) = token.parse::<IpAddr>() {
                builder.add_ip(ip);
            } else if let Ok(range) = IpRange::parse(token) {
                builder.add_range(range);
            } else if let Some(net) = token
                .contains('/')
                .then(|| token.parse::<IpNetwork>().ok())
                .flatten()
            {
                builder.add_prefix(net);
            } else {
                return Err(Error::Parse(format!(
                    "unable to parse {} as ip, range, or prefix",
                    token
                )));
            }
        }

        Ok(builder.build())
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        let probe = Interval::single(ip);
        self.intervals
            .iter()
            .any(|iv| iv.family == probe.family && iv.start <= probe.start && probe.start <= iv.end)
    }

    /// Canonical ranges in ascending order, IPv4 before IPv6
    pub fn ranges(&self) -> Vec<IpRange> {
        self.intervals
            .iter()
            .map(|iv| IpRange {
                start: iv.bound(iv.start),
                end: iv.bound(iv.end),
            })
            .collect()
    }
}

impl std::fmt::Display for IpSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .ranges()
            .into_iter()
            .map(|r| {
                if r.start == r.end {
                    r.start.to_string()
                } else {
                    r.to_string()
                }
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> IpSet {
        IpSet::parse_tenable(s).unwrap()
    }

    #[test]
    fn test_parse_forms() {
        let s = set("10.0.0.1,10.0.1.0-10.0.1.9,192.168.0.0/30");
        assert!(s.contains("10.0.0.1".parse().unwrap()));
        assert!(s.contains("10.0.1.5".parse().unwrap()));
        assert!(s.contains("192.168.0.3".parse().unwrap()));
        assert!(!s.contains("192.168.0.4".parse().unwrap()));
    }

    #[test]
    fn test_quotes_and_newlines_are_delimiters() {
        assert_eq!(set("\"10.0.0.1\",\"10.0.0.2\"\n10.0.0.3"), set("10.0.0.1-10.0.0.3"));
    }

    #[test]
    fn test_adjacent_and_overlapping_merge() {
        assert_eq!(set("10.0.0.0/25,10.0.0.128/25"), set("10.0.0.0/24"));
        assert_eq!(set("10.0.0.0-10.0.0.10,10.0.0.5-10.0.0.20"), set("10.0.0.0-10.0.0.20"));
        assert_eq!(set("10.0.0.2,10.0.0.1,10.0.0.3").ranges().len(), 1);
    }

    #[test]
    fn test_prefix_host_bits_are_masked() {
        assert_eq!(set("10.1.2.3/24"), set("10.1.2.0-10.1.2.255"));
    }

    #[test]
    fn test_ipv6() {
        assert_eq!(set("2001:db8::/127"), set("2001:db8::,2001:db8::1"));
        assert_ne!(set("2001:db8::1"), set("10.0.0.1"));
        assert!(set("::/0").contains("2001:db8::5".parse().unwrap()));
    }

    #[test]
    fn test_bad_token_is_error() {
        let err = IpSet::parse_tenable("10.0.0.1,not-an-ip").unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
        assert!(IpSet::parse_tenable("10.0.0.9-10.0.0.1").is_err());
        assert!(IpSet::parse_tenable("10.0.0.1-2001:db8::1").is_err());
    }

    #[test]
    fn test_whitespace_around_tokens_is_ignored() {
        assert_eq!(set("10.0.0.1, 10.0.0.2"), set("10.0.0.1,10.0.0.2"));
        assert_eq!(set(" 10.0.0.0/30 ,\n10.0.0.8 "), set("10.0.0.0/30,10.0.0.8"));
    }

    #[test]
    fn test_empty_list() {
        assert!(set("").is_empty());
        assert!(set("\"\"").is_empty());
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(set("10.0.0.3,10.0.0.1-10.0.0.2,10.0.0.9").to_string(), "10.0.0.1-10.0.0.3,10.0.0.9");
    }
}
