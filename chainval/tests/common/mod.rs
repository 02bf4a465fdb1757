//! In-memory certificate factory shared by the integration tests. Certificates carry P-256 or RSA
//! public keys but are "signed" with SHA-256 over the TBSCertificate and the issuer's public key,
//! which [`fake_verify_signature_message`] checks. This keeps every test deterministic and lets
//! tests produce bad signatures on purpose.

#![allow(dead_code)]

use core::str::FromStr;
use core::time::Duration;

use chainval::*;
use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_NAME_CONSTRAINTS, ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER,
};
use der::asn1::{BitString, Ia5String, ObjectIdentifier, OctetString, UtcTime};
use der::{Any, Encode};
use hex_literal::hex;
use sha2::{Digest, Sha256};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::ext::pkix::constraints::name::GeneralSubtree;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::*;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

/// 2023-11-14T22:13:20Z
pub const NOW: u64 = 1_700_000_000;
/// 2020-09-13T12:26:40Z
pub const NOT_BEFORE: u64 = 1_600_000_000;
/// 2030-03-17T17:46:40Z
pub const NOT_AFTER: u64 = 1_900_000_000;

const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const AKI_PREFIX: [u8; 4] = hex!("0a0b0c0d");

/// Checks signatures produced by [`TestCert::build`]
pub fn fake_verify_signature_message(
    _pe: &PkiEnvironment,
    message_to_verify: &[u8],
    signature: &[u8],
    _signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<()> {
    if fake_signature(message_to_verify, spki).as_slice() == signature {
        Ok(())
    } else {
        Err(Error::failure(
            PathValidationStatus::SignatureVerificationFailure,
            "fake signature did not verify",
        ))
    }
}

fn fake_signature(message: &[u8], spki: &SubjectPublicKeyInfoOwned) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.update(spki.subject_public_key.raw_bytes());
    hasher.finalize().to_vec()
}

/// A [`PkiEnvironment`] that verifies fake signatures only
pub fn fake_pki_environment() -> PkiEnvironment {
    let mut pe = PkiEnvironment::new();
    pe.add_verify_signature_message_callback(fake_verify_signature_message);
    pe
}

/// A P-256 public key distinguished by `id`. The point is not on the curve, which does not matter
/// for fake signatures.
pub fn ec_key(id: u8) -> SubjectPublicKeyInfoOwned {
    let mut point = vec![0x04];
    point.extend_from_slice(&[id; 64]);
    SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_EC_PUBLIC_KEY,
            parameters: Some(Any::encode_from(&PKIXALG_SECP256R1).unwrap()),
        },
        subject_public_key: BitString::from_bytes(&point).unwrap(),
    }
}

/// An RSA public key with a modulus of `bits` bits, a multiple of eight
pub fn rsa_key(bits: usize, id: u8) -> SubjectPublicKeyInfoOwned {
    let mut modulus = vec![0xC0 | (id & 0x0F); bits / 8];
    modulus[bits / 8 - 1] |= 1;
    let key = rsa::pkcs1::RsaPublicKey {
        modulus: der::asn1::UintRef::new(&modulus).unwrap(),
        public_exponent: der::asn1::UintRef::new(&[1, 0, 1]).unwrap(),
    };
    SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_RSA_ENCRYPTION,
            parameters: Some(Any::null()),
        },
        subject_public_key: BitString::from_bytes(&key.to_der().unwrap()).unwrap(),
    }
}

fn time(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

fn encode_ext(oid: ObjectIdentifier, critical: bool, value: &impl Encode) -> Extension {
    Extension {
        extn_id: oid,
        critical,
        extn_value: OctetString::new(value.to_der().unwrap()).unwrap(),
    }
}

pub fn bc_ext(ca: bool, path_len_constraint: Option<u8>, critical: bool) -> Extension {
    encode_ext(
        ID_CE_BASIC_CONSTRAINTS,
        critical,
        &BasicConstraints {
            ca,
            path_len_constraint,
        },
    )
}

pub fn ku_ext(usages: KeyUsage, critical: bool) -> Extension {
    encode_ext(ID_CE_KEY_USAGE, critical, &usages)
}

pub fn cert_sign_ku_ext() -> Extension {
    ku_ext(KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign), true)
}

pub fn eku_ext(purposes: &[ObjectIdentifier]) -> Extension {
    encode_ext(
        ID_CE_EXT_KEY_USAGE,
        false,
        &ExtendedKeyUsage(purposes.to_vec()),
    )
}

pub fn san_ext(names: Vec<GeneralName>, critical: bool) -> Extension {
    encode_ext(ID_CE_SUBJECT_ALT_NAME, critical, &SubjectAltName(names))
}

pub fn dns(name: &str) -> GeneralName {
    GeneralName::DnsName(Ia5String::new(name).unwrap())
}

pub fn ip(octets: &[u8]) -> GeneralName {
    GeneralName::IpAddress(OctetString::new(octets.to_vec()).unwrap())
}

pub fn aki_ext(issuer_key_id: u8) -> Extension {
    let mut kid = AKI_PREFIX.to_vec();
    kid.push(issuer_key_id);
    encode_ext(
        ID_CE_AUTHORITY_KEY_IDENTIFIER,
        false,
        &AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(kid).unwrap()),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        },
    )
}

pub fn ski_ext(key_id: u8) -> Extension {
    let mut kid = AKI_PREFIX.to_vec();
    kid.push(key_id);
    encode_ext(
        ID_CE_SUBJECT_KEY_IDENTIFIER,
        false,
        &SubjectKeyIdentifier(OctetString::new(kid).unwrap()),
    )
}

pub fn nc_ext(permitted: Vec<GeneralName>, excluded: Vec<GeneralName>) -> Extension {
    let subtrees = |names: Vec<GeneralName>| {
        if names.is_empty() {
            None
        } else {
            Some(
                names
                    .into_iter()
                    .map(|base| GeneralSubtree {
                        base,
                        minimum: 0,
                        maximum: None,
                    })
                    .collect(),
            )
        }
    };
    encode_ext(
        ID_CE_NAME_CONSTRAINTS,
        true,
        &NameConstraints {
            permitted_subtrees: subtrees(permitted),
            excluded_subtrees: subtrees(excluded),
        },
    )
}

/// Describes a certificate to be produced by [`TestCert::build`]
#[derive(Clone)]
pub struct TestCert {
    pub subject: String,
    pub issuer: String,
    pub key: SubjectPublicKeyInfoOwned,
    pub issuer_key: SubjectPublicKeyInfoOwned,
    pub serial: Vec<u8>,
    pub not_before: u64,
    pub not_after: u64,
    pub extensions: Vec<Extension>,
    pub corrupt_signature: bool,
}

impl TestCert {
    /// A CA certificate named `subject` with key `key_id`, issued by `issuer` with key `issuer_key_id`
    pub fn ca(subject: &str, key_id: u8, issuer: &str, issuer_key_id: u8) -> TestCert {
        TestCert {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            key: ec_key(key_id),
            issuer_key: ec_key(issuer_key_id),
            serial: vec![key_id, issuer_key_id],
            not_before: NOT_BEFORE,
            not_after: NOT_AFTER,
            extensions: vec![
                bc_ext(true, None, true),
                cert_sign_ku_ext(),
                aki_ext(issuer_key_id),
                ski_ext(key_id),
            ],
            corrupt_signature: false,
        }
    }

    /// A self-signed CA certificate suitable as a trust anchor
    pub fn root(subject: &str, key_id: u8) -> TestCert {
        TestCert::ca(subject, key_id, subject, key_id)
    }

    /// An end entity certificate for `dns_name` with the serverAuth and clientAuth purposes
    pub fn leaf(dns_name: &str, key_id: u8, issuer: &str, issuer_key_id: u8) -> TestCert {
        TestCert {
            subject: format!("CN={}", dns_name),
            issuer: issuer.to_string(),
            key: ec_key(key_id),
            issuer_key: ec_key(issuer_key_id),
            serial: vec![0x10, key_id, issuer_key_id],
            not_before: NOT_BEFORE,
            not_after: NOT_AFTER,
            extensions: vec![
                aki_ext(issuer_key_id),
                ku_ext(KeyUsage(KeyUsages::DigitalSignature.into()), true),
                eku_ext(&[EKU_SERVER_AUTH, EKU_CLIENT_AUTH]),
                san_ext(vec![dns(dns_name)], false),
            ],
            corrupt_signature: false,
        }
    }

    /// Replaces the extension with the same OID as `ext`, or appends `ext` if there is none
    pub fn with_extension(mut self, ext: Extension) -> TestCert {
        match self.extensions.iter().position(|e| e.extn_id == ext.extn_id) {
            Some(i) => self.extensions[i] = ext,
            None => self.extensions.push(ext),
        }
        self
    }

    /// Removes the extension identified by `oid`
    pub fn without_extension(mut self, oid: ObjectIdentifier) -> TestCert {
        self.extensions.retain(|e| e.extn_id != oid);
        self
    }

    pub fn build(&self) -> PDVCertificate {
        let signature_algorithm = match self.issuer_key.algorithm.oid {
            PKIXALG_RSA_ENCRYPTION => AlgorithmIdentifierOwned {
                oid: SHA256_WITH_RSA,
                parameters: None,
            },
            _ => AlgorithmIdentifierOwned {
                oid: PKIXALG_ECDSA_WITH_SHA256,
                parameters: None,
            },
        };
        let tbs_certificate = TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(&self.serial).unwrap(),
            signature: signature_algorithm.clone(),
            issuer: Name::from_str(&self.issuer).unwrap(),
            validity: Validity {
                not_before: time(self.not_before),
                not_after: time(self.not_after),
            },
            subject: Name::from_str(&self.subject).unwrap(),
            subject_public_key_info: self.key.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if self.extensions.is_empty() {
                None
            } else {
                Some(self.extensions.clone())
            },
        };
        let tbs = tbs_certificate.to_der().unwrap();
        let mut signature = fake_signature(&tbs, &self.issuer_key);
        if self.corrupt_signature {
            signature[0] ^= 0xFF;
        }
        let cert = Certificate {
            tbs_certificate,
            signature_algorithm,
            signature: BitString::from_bytes(&signature).unwrap(),
        };
        PDVCertificate::try_from(cert).unwrap()
    }
}

/// A store holding the given anchors
pub fn store(anchors: &[&TestCert]) -> Store {
    Store::new(anchors.iter().map(|a| a.build()).collect()).unwrap()
}

/// A builder with the fake signature environment, [`NOW`] as the validation time and `store`
pub fn builder(store: Store) -> PolicyBuilder {
    PolicyBuilder::new()
        .pki_environment(fake_pki_environment())
        .time(TimeOfInterest::from_unix_secs(NOW).unwrap())
        .store(store)
}

/// A server subject for `name`
pub fn dns_subject(name: &str) -> Subject {
    Subject::Dns(DnsName::new(name).unwrap())
}
