//! Structures and functions related to processing name constraints
//!
//! Only dNSName and iPAddress subtrees are enforced, and only against the subjectAltName entries of
//! the end entity certificate. Subtrees of other name forms are ignored. A wildcard dNSName stands
//! for every name one label below its parent: it is permitted only if all of those names are, and
//! excluded if any of them might be.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use x509_cert::ext::pkix::{
    constraints::name::GeneralSubtrees, name::GeneralName, NameConstraints, SubjectAltName,
};

use crate::{
    subject::{DnsName, DnsPattern, IpAddress},
    util::error::*,
};

/// The dNSName and iPAddress subtrees asserted by one nameConstraints extension
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NameConstraintsSet {
    /// permitted dNSName subtrees
    pub permitted_dns_names: Vec<String>,
    /// excluded dNSName subtrees
    pub excluded_dns_names: Vec<String>,
    /// permitted iPAddress subtrees, each an address followed by a mask
    pub permitted_ip_addresses: Vec<Vec<u8>>,
    /// excluded iPAddress subtrees, each an address followed by a mask
    pub excluded_ip_addresses: Vec<Vec<u8>>,
}

fn collect(subtrees: &Option<GeneralSubtrees>, dns: &mut Vec<String>, ip: &mut Vec<Vec<u8>>) {
    if let Some(subtrees) = subtrees {
        for subtree in subtrees {
            match &subtree.base {
                GeneralName::DnsName(name) => dns.push(name.to_string()),
                GeneralName::IpAddress(range) => ip.push(range.as_bytes().to_vec()),
                _ => {}
            }
        }
    }
}

fn plain_constraint(constraint: &str) -> String {
    constraint
        .strip_prefix('.')
        .unwrap_or(constraint)
        .to_ascii_lowercase()
}

/// Returns true if every name exactly one label below `parent` is within `constraint`
fn wildcard_within(parent: &DnsName, constraint: &str) -> bool {
    parent.is_within(plain_constraint(constraint).as_str())
}

/// Returns true if `constraint` could describe any name exactly one label below `parent`, i.e., the
/// constraint covers `parent` or lies at or below one of its immediate subdomains.
fn wildcard_overlaps(parent: &DnsName, constraint: &str) -> bool {
    let plain = plain_constraint(constraint);
    if parent.is_within(plain.as_str()) {
        return true;
    }
    match DnsName::new(plain.as_str()) {
        Some(c) => c != *parent && c.is_within(parent.as_str()),
        None => false,
    }
}

impl NameConstraintsSet {
    /// Collects the supported subtrees from a nameConstraints extension
    pub fn from_name_constraints(nc: &NameConstraints) -> NameConstraintsSet {
        let mut set = NameConstraintsSet::default();
        collect(
            &nc.permitted_subtrees,
            &mut set.permitted_dns_names,
            &mut set.permitted_ip_addresses,
        );
        collect(
            &nc.excluded_subtrees,
            &mut set.excluded_dns_names,
            &mut set.excluded_ip_addresses,
        );
        set
    }

    fn dns_pattern_permitted(&self, pattern: &DnsPattern) -> bool {
        match pattern {
            DnsPattern::Exact(name) => self.dns_name_permitted(name),
            DnsPattern::Wildcard(parent) => {
                if self
                    .excluded_dns_names
                    .iter()
                    .any(|c| wildcard_overlaps(parent, c.as_str()))
                {
                    return false;
                }
                self.permitted_dns_names.is_empty()
                    || self
                        .permitted_dns_names
                        .iter()
                        .any(|c| wildcard_within(parent, c.as_str()))
            }
        }
    }

    fn dns_name_permitted(&self, name: &DnsName) -> bool {
        if self
            .excluded_dns_names
            .iter()
            .any(|c| name.is_within(c.as_str()))
        {
            return false;
        }
        self.permitted_dns_names.is_empty()
            || self
                .permitted_dns_names
                .iter()
                .any(|c| name.is_within(c.as_str()))
    }

    fn ip_address_permitted(&self, addr: &IpAddress) -> bool {
        if self.excluded_ip_addresses.iter().any(|c| addr.is_within(c)) {
            return false;
        }
        self.permitted_ip_addresses.is_empty()
            || self.permitted_ip_addresses.iter().any(|c| addr.is_within(c))
    }

    /// `san_within_subtrees` returns an error naming the first subjectAltName entry that falls
    /// within an excluded subtree or outside the permitted subtrees of its name form.
    pub fn san_within_subtrees(&self, san: &SubjectAltName) -> Result<()> {
        for gn in san.0.iter() {
            let (ok, value) = match gn {
                GeneralName::DnsName(dns) => {
                    let value = dns.to_string();
                    let ok = match DnsPattern::new(value.as_str()) {
                        Some(pattern) => self.dns_pattern_permitted(&pattern),
                        // a name that cannot be parsed cannot be shown to satisfy a constraint
                        None => {
                            self.permitted_dns_names.is_empty()
                                && self.excluded_dns_names.is_empty()
                        }
                    };
                    (ok, value)
                }
                GeneralName::IpAddress(octets) => {
                    let ok = match IpAddress::from_bytes(octets.as_bytes()) {
                        Some(addr) => self.ip_address_permitted(&addr),
                        None => {
                            self.permitted_ip_addresses.is_empty()
                                && self.excluded_ip_addresses.is_empty()
                        }
                    };
                    (ok, format!("{:02x?}", octets.as_bytes()))
                }
                _ => continue,
            };
            if !ok {
                return Err(Error::failure(
                    PathValidationStatus::NameConstraintsViolation,
                    format!("subjectAltName entry {} violates name constraints", value),
                ));
            }
        }
        Ok(())
    }
}

#[test]
fn name_constraints_set_test() {
    use der::asn1::{Ia5String, OctetString};
    use x509_cert::ext::pkix::constraints::name::GeneralSubtree;

    let subtree = |gn: GeneralName| GeneralSubtree {
        base: gn,
        minimum: 0,
        maximum: None,
    };
    let nc = NameConstraints {
        permitted_subtrees: Some(alloc::vec![
            subtree(GeneralName::DnsName(Ia5String::new("example.com").unwrap())),
            subtree(GeneralName::IpAddress(
                OctetString::new(alloc::vec![10, 0, 0, 0, 255, 0, 0, 0]).unwrap()
            )),
        ]),
        excluded_subtrees: Some(alloc::vec![subtree(GeneralName::DnsName(
            Ia5String::new("bad.example.com").unwrap()
        ))]),
    };
    let set = NameConstraintsSet::from_name_constraints(&nc);

    let san = |gn: GeneralName| SubjectAltName(alloc::vec![gn]);
    let dns = |s: &str| GeneralName::DnsName(Ia5String::new(s).unwrap());
    let ip = |b: &[u8]| GeneralName::IpAddress(OctetString::new(b.to_vec()).unwrap());

    assert!(set.san_within_subtrees(&san(dns("www.example.com"))).is_ok());
    assert!(set.san_within_subtrees(&san(dns("example.org"))).is_err());
    assert!(set.san_within_subtrees(&san(dns("x.bad.example.com"))).is_err());
    // *.example.com covers bad.example.com
    assert!(set.san_within_subtrees(&san(dns("*.example.com"))).is_err());
    assert!(set.san_within_subtrees(&san(dns("*.www.example.com"))).is_ok());
    assert!(set.san_within_subtrees(&san(dns("*.bad.example.com"))).is_err());
    assert!(set.san_within_subtrees(&san(ip(&[10, 1, 2, 3]))).is_ok());
    assert!(set.san_within_subtrees(&san(ip(&[192, 168, 0, 1]))).is_err());

    let subdomains_only = NameConstraintsSet {
        permitted_dns_names: alloc::vec![".example.com".to_string()],
        ..Default::default()
    };
    assert!(subdomains_only
        .san_within_subtrees(&san(dns("*.example.com")))
        .is_ok());
    assert!(subdomains_only
        .san_within_subtrees(&san(dns("example.com")))
        .is_err());
    assert!(subdomains_only
        .san_within_subtrees(&san(dns("*.com")))
        .is_err());
}
