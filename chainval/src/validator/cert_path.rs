//! Provides structures that represent a verified certification path and, for client verification,
//! the names the end entity certificate was issued for.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use der::asn1::ObjectIdentifier;
use x509_cert::ext::pkix::{name::GeneralName, SubjectAltName};
use x509_cert::name::Name;

use crate::{subject::IpAddress, util::error::*, PDVCertificate, TrustAnchor};

/// `VerifiedPath` is the result of a successful path search. `certificates` begins with the end entity
/// certificate and proceeds through the intermediate CA certificates, i.e., `certificates[0]` was
/// issued by `certificates[1]` and so on, until the last certificate, which was issued by
/// `trust_anchor`. The trust anchor is not included in `certificates`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[readonly::make]
pub struct VerifiedPath {
    /// End entity certificate followed by zero or more intermediate CA certificates
    pub certificates: Vec<PDVCertificate>,
    /// Trust anchor that issued the last certificate in `certificates`
    pub trust_anchor: TrustAnchor,
}

impl VerifiedPath {
    pub(crate) fn new(certificates: Vec<PDVCertificate>, trust_anchor: TrustAnchor) -> VerifiedPath {
        VerifiedPath {
            certificates,
            trust_anchor,
        }
    }

    /// The end entity certificate
    pub fn leaf(&self) -> &PDVCertificate {
        &self.certificates[0]
    }

    /// Intermediate CA certificates, beginning with the issuer of the end entity certificate
    pub fn intermediates(&self) -> &[PDVCertificate] {
        &self.certificates[1..]
    }

    /// Number of certificates in the path, not counting the trust anchor
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Always false, a path contains at least the end entity certificate
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// A subjectAltName entry of an end entity certificate verified by a
/// [`ClientVerifier`](crate::ClientVerifier)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubjectName {
    /// rfc822Name
    Email(String),
    /// dNSName
    Dns(String),
    /// iPAddress
    Ip(IpAddress),
    /// uniformResourceIdentifier
    Uri(String),
    /// directoryName
    Directory(Name),
    /// registeredID
    RegisteredId(ObjectIdentifier),
}

impl TryFrom<&GeneralName> for SubjectName {
    type Error = Error;

    fn try_from(gn: &GeneralName) -> Result<Self> {
        match gn {
            GeneralName::Rfc822Name(s) => Ok(SubjectName::Email(s.to_string())),
            GeneralName::DnsName(s) => Ok(SubjectName::Dns(s.to_string())),
            GeneralName::UniformResourceIdentifier(s) => Ok(SubjectName::Uri(s.to_string())),
            GeneralName::DirectoryName(n) => Ok(SubjectName::Directory(n.clone())),
            GeneralName::RegisteredId(oid) => Ok(SubjectName::RegisteredId(*oid)),
            GeneralName::IpAddress(octets) => IpAddress::from_bytes(octets.as_bytes())
                .map(SubjectName::Ip)
                .ok_or(Error::UnsupportedGeneralNameType),
            GeneralName::OtherName(_) | GeneralName::EdiPartyName(_) => {
                Err(Error::UnsupportedGeneralNameType)
            }
        }
    }
}

/// Converts every entry of a subjectAltName extension, failing on the first entry that has no
/// [`SubjectName`] form
pub fn subject_names_from_san(san: &SubjectAltName) -> Result<Vec<SubjectName>> {
    san.0.iter().map(SubjectName::try_from).collect()
}

/// `VerifiedClient` is the result of successful client verification: the verified path along with
/// the subjectAltName entries of the end entity certificate, or None if it has no subjectAltName
/// extension.
#[derive(Clone, Debug, Eq, PartialEq)]
#[readonly::make]
pub struct VerifiedClient {
    /// The verified path
    pub chain: VerifiedPath,
    /// subjectAltName entries of the end entity certificate
    pub subjects: Option<Vec<SubjectName>>,
}

impl VerifiedClient {
    pub(crate) fn new(chain: VerifiedPath) -> Result<VerifiedClient> {
        let subjects = match chain.leaf().subject_alt_name() {
            Some(san) => Some(subject_names_from_san(san)?),
            None => None,
        };
        Ok(VerifiedClient { chain, subjects })
    }
}

#[test]
fn subject_names_from_san_test() {
    use der::asn1::{Ia5String, OctetString};
    use x509_cert::ext::pkix::name::OtherName;

    let san = SubjectAltName(alloc::vec![
        GeneralName::DnsName(Ia5String::new("example.com").unwrap()),
        GeneralName::Rfc822Name(Ia5String::new("user@example.com").unwrap()),
        GeneralName::IpAddress(OctetString::new(alloc::vec![127, 0, 0, 1]).unwrap()),
    ]);
    let names = subject_names_from_san(&san).unwrap();
    assert_eq!(names[0], SubjectName::Dns("example.com".to_string()));
    assert_eq!(names[1], SubjectName::Email("user@example.com".to_string()));
    assert_eq!(names[2].clone(), SubjectName::Ip(IpAddress::from_bytes(&[127, 0, 0, 1]).unwrap()));

    let other = SubjectAltName(alloc::vec![GeneralName::OtherName(OtherName {
        type_id: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.20.2.3"),
        value: der::Any::null(),
    })]);
    assert_eq!(
        subject_names_from_san(&other),
        Err(Error::UnsupportedGeneralNameType)
    );
}
