//! Names a server verifier can be asked to validate and the rules for matching them against the
//! subjectAltName extension of an end entity certificate.
//!
//! DNS names are compared case-insensitively. A subjectAltName dNSName may use a wildcard only as
//! the entire leftmost label (i.e., `*.example.com`), in which case it matches exactly one label in
//! that position. IP addresses are compared octet for octet.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use x509_cert::ext::pkix::{name::GeneralName, SubjectAltName};

/// A syntactically valid DNS host name, held in lowercase
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DnsName(String);

fn valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl DnsName {
    /// Returns a DnsName if `value` is a valid host name, i.e., one to 253 characters composed of
    /// dot-separated labels of letters, digits, hyphens and underscores.
    pub fn new(value: &str) -> Option<DnsName> {
        if value.is_empty() || value.len() > 253 {
            return None;
        }
        if value.split('.').all(valid_label) {
            Some(DnsName(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// The lowercase name
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the name with its leftmost label removed, or None for a single-label name
    pub fn parent(&self) -> Option<DnsName> {
        self.0
            .split_once('.')
            .map(|(_, rest)| DnsName(rest.to_string()))
    }

    /// Returns true if this name is equal to or a subdomain of `constraint`, which is a dNSName
    /// taken from a name constraints extension. A constraint with a leading period only matches
    /// subdomains and an empty constraint matches every name.
    pub fn is_within(&self, constraint: &str) -> bool {
        let constraint = constraint.to_ascii_lowercase();
        if constraint.is_empty() {
            return true;
        }
        if let Some(stripped) = constraint.strip_prefix('.') {
            return self.0.len() > stripped.len() + 1
                && self.0.ends_with(constraint.as_str())
                && !stripped.is_empty();
        }
        if self.0 == constraint {
            return true;
        }
        self.0.len() > constraint.len()
            && self.0.ends_with(constraint.as_str())
            && self.0.as_bytes()[self.0.len() - constraint.len() - 1] == b'.'
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dNSName read from a subjectAltName extension
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DnsPattern {
    /// Matches only the given name
    Exact(DnsName),
    /// `*.parent`: matches any name exactly one label below `parent`
    Wildcard(DnsName),
}

impl DnsPattern {
    /// Parses a dNSName value, returning None for values that are neither valid host names nor
    /// a wildcard followed by a valid host name.
    pub fn new(pattern: &str) -> Option<DnsPattern> {
        match pattern.strip_prefix("*.") {
            Some(parent) => DnsName::new(parent).map(DnsPattern::Wildcard),
            None => DnsName::new(pattern).map(DnsPattern::Exact),
        }
    }

    /// Returns true if `name` is matched by this pattern
    pub fn matches(&self, name: &DnsName) -> bool {
        match self {
            DnsPattern::Exact(exact) => exact == name,
            DnsPattern::Wildcard(parent) => name.parent().as_ref() == Some(parent),
        }
    }
}

/// An IPv4 or IPv6 address
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IpAddress(IpAddr);

impl IpAddress {
    /// Reads an iPAddress GeneralName value, i.e., four or sixteen octets
    pub fn from_bytes(bytes: &[u8]) -> Option<IpAddress> {
        if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
            return Some(IpAddress(IpAddr::V4(Ipv4Addr::from(v4))));
        }
        if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
            return Some(IpAddress(IpAddr::V6(Ipv6Addr::from(v6))));
        }
        None
    }

    /// The address octets in network order
    pub fn octets(&self) -> Vec<u8> {
        match self.0 {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }

    /// Returns true if this address falls within the range described by an iPAddress name
    /// constraint, i.e., an address followed by a mask of the same length. Constraints for the
    /// other address family never match.
    pub fn is_within(&self, constraint: &[u8]) -> bool {
        let octets = self.octets();
        if constraint.len() != octets.len() * 2 {
            return false;
        }
        let (network, mask) = constraint.split_at(octets.len());
        octets
            .iter()
            .zip(network.iter().zip(mask.iter()))
            .all(|(o, (n, m))| o & m == n & m)
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        IpAddress(addr)
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The name a server verifier validates the end entity certificate for
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Subject {
    /// A DNS host name
    Dns(DnsName),
    /// An IP address
    Ip(IpAddress),
}

impl Subject {
    /// Returns true if any subjectAltName entry of the matching type matches this subject. Entries
    /// that are not valid names are skipped.
    pub fn matches(&self, san: &SubjectAltName) -> bool {
        san.0.iter().any(|gn| match (self, gn) {
            (Subject::Dns(name), GeneralName::DnsName(pattern)) => {
                match DnsPattern::new(pattern.to_string().as_str()) {
                    Some(pattern) => pattern.matches(name),
                    None => false,
                }
            }
            (Subject::Ip(addr), GeneralName::IpAddress(octets)) => {
                addr.octets().as_slice() == octets.as_bytes()
            }
            _ => false,
        })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Dns(name) => name.fmt(f),
            Subject::Ip(addr) => addr.fmt(f),
        }
    }
}

#[test]
fn dns_name_test() {
    assert!(DnsName::new("example.com").is_some());
    assert_eq!(
        DnsName::new("WWW.Example.COM").unwrap().as_str(),
        "www.example.com"
    );
    assert!(DnsName::new("").is_none());
    assert!(DnsName::new("exa mple.com").is_none());
    assert!(DnsName::new("-bad.example.com").is_none());
    assert!(DnsName::new("a..b").is_none());
    assert!(DnsName::new("*.example.com").is_none());
}

#[test]
fn dns_pattern_test() {
    let name = DnsName::new("www.example.com").unwrap();
    let deeper = DnsName::new("a.www.example.com").unwrap();
    let apex = DnsName::new("example.com").unwrap();

    let wildcard = DnsPattern::new("*.example.com").unwrap();
    assert!(wildcard.matches(&name));
    assert!(!wildcard.matches(&deeper));
    assert!(!wildcard.matches(&apex));

    let exact = DnsPattern::new("WWW.example.com").unwrap();
    assert!(exact.matches(&name));
    assert!(!exact.matches(&apex));

    assert!(DnsPattern::new("w*.example.com").is_none());
    assert!(DnsPattern::new("*.*.example.com").is_none());
}

#[test]
fn dns_constraint_test() {
    let name = DnsName::new("host.example.com").unwrap();
    assert!(name.is_within("example.com"));
    assert!(name.is_within(".example.com"));
    assert!(name.is_within("host.example.com"));
    assert!(!name.is_within(".host.example.com"));
    assert!(!name.is_within("ample.com"));
    assert!(name.is_within(""));
}

#[test]
fn ip_address_test() {
    let v4 = IpAddress::from_bytes(&[192, 168, 1, 10]).unwrap();
    assert!(v4.is_within(&[192, 168, 0, 0, 255, 255, 0, 0]));
    assert!(!v4.is_within(&[10, 0, 0, 0, 255, 0, 0, 0]));
    assert!(!v4.is_within(&[0u8; 32]));
    assert!(IpAddress::from_bytes(&[1, 2, 3]).is_none());
    assert_eq!(IpAddress::from_bytes(&[0u8; 16]).unwrap().octets().len(), 16);
}
