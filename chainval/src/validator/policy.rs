//! The frozen set of validation parameters shared by the path builder and extension validators,
//! along with the certificate checks that depend only on those parameters.

use alloc::collections::BTreeSet;
use alloc::format;

use der::asn1::ObjectIdentifier;
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::time::Time;
use x509_cert::Version;

use crate::{
    crypto::{get_named_curve_parameter, get_pss_hash_algorithm, get_rsa_modulus_bits},
    path_settings::PathBuildingLimits,
    pdv_certificate::PDVCertificate,
    subject::Subject,
    util::error::*,
    util::pdv_alg_oids::*,
    util::pdv_utilities::{name_to_string, valid_at_time},
    TimeOfInterest,
};

/// Default maximum number of non-self-issued intermediate CA certificates in a path
pub const DEFAULT_MAX_CHAIN_DEPTH: u8 = 8;

/// Default minimum size, in bits, of RSA moduli in a path
pub const DEFAULT_MINIMUM_RSA_MODULUS: usize = 2048;

/// Largest serial number, in octets, accepted by [`Policy::permits_basic`]. Twenty octets is the
/// limit from RFC 5280 plus one for a leading zero.
const MAX_SERIAL_LEN: usize = 21;

/// Returns the public key algorithms accepted by default: RSA and ECDSA using P-256 or P-384. EC keys
/// are identified by their named curve.
pub fn default_permitted_public_key_algorithms() -> BTreeSet<ObjectIdentifier> {
    [
        PKIXALG_RSA_ENCRYPTION,
        PKIXALG_SECP256R1,
        PKIXALG_SECP384R1,
    ]
    .into_iter()
    .collect()
}

/// Returns the signature algorithms accepted by default: RSA PKCS #1 v1.5 and RSASSA-PSS with SHA-2
/// and ECDSA with SHA-256, SHA-384 or SHA-512. RSASSA-PSS is further limited to the parameter sets
/// recognized by [`get_pss_hash_algorithm`].
pub fn default_permitted_signature_algorithms() -> BTreeSet<ObjectIdentifier> {
    [
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION,
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION,
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION,
        PKIXALG_RSASSA_PSS,
        PKIXALG_ECDSA_WITH_SHA256,
        PKIXALG_ECDSA_WITH_SHA384,
        PKIXALG_ECDSA_WITH_SHA512,
    ]
    .into_iter()
    .collect()
}

/// Identifies the kind of a public key: the algorithm OID for RSA keys and the named curve for EC keys
pub fn public_key_kind(spki: &SubjectPublicKeyInfoOwned) -> Result<ObjectIdentifier> {
    if spki.algorithm.oid == PKIXALG_EC_PUBLIC_KEY {
        get_named_curve_parameter(&spki.algorithm)
    } else {
        Ok(spki.algorithm.oid)
    }
}

fn invalid(cert: &PDVCertificate, what: &str) -> Error {
    Error::failure(
        PathValidationStatus::InvalidCertificate,
        format!("{}: {}", name_to_string(cert.subject()), what),
    )
}

/// Validation parameters for one verifier. Policies are built by [`PolicyBuilder`](crate::PolicyBuilder)
/// and never change afterwards.
#[derive(Clone, Debug)]
#[readonly::make]
pub struct Policy {
    /// Instant at which every certificate in a path must be valid
    pub validation_time: TimeOfInterest,
    /// Maximum number of non-self-issued intermediate CA certificates between leaf and anchor
    pub max_chain_depth: u8,
    /// Name the end entity must be issued for (server verification) or None (client verification)
    pub subject: Option<Subject>,
    /// Purpose the end entity's extKeyUsage extension must permit, if present
    pub extended_key_usage: ObjectIdentifier,
    /// Minimum size, in bits, of RSA moduli in the path, trust anchor included
    pub minimum_rsa_modulus: usize,
    /// Accepted public key kinds, see [`public_key_kind`]
    pub permitted_public_key_algorithms: BTreeSet<ObjectIdentifier>,
    /// Accepted certificate signature algorithms
    pub permitted_signature_algorithms: BTreeSet<ObjectIdentifier>,
    /// Bounds on the work performed when searching for a path
    pub limits: PathBuildingLimits,
}

impl Policy {
    pub(crate) fn new(
        validation_time: TimeOfInterest,
        max_chain_depth: u8,
        subject: Option<Subject>,
        extended_key_usage: ObjectIdentifier,
        minimum_rsa_modulus: usize,
        limits: PathBuildingLimits,
    ) -> Policy {
        Policy {
            validation_time,
            max_chain_depth,
            subject,
            extended_key_usage,
            minimum_rsa_modulus,
            permitted_public_key_algorithms: default_permitted_public_key_algorithms(),
            permitted_signature_algorithms: default_permitted_signature_algorithms(),
            limits,
        }
    }

    /// `permits_basic` performs the structural checks that apply to every certificate other than a
    /// trust anchor: X.509 v3, agreement of the inner and outer signature algorithms, a positive
    /// serial number of at most 21 octets, a non-empty issuer, UTCTime for dates before 2050 and
    /// validity at the validation time.
    pub fn permits_basic(&self, cert: &PDVCertificate) -> Result<()> {
        let tbs = &cert.decoded_cert.tbs_certificate;
        if tbs.version != Version::V3 {
            return Err(invalid(cert, "certificate is not X.509 v3"));
        }

        if cert.decoded_cert.signature_algorithm != tbs.signature {
            return Err(invalid(
                cert,
                "signatureAlgorithm does not match the signature field of the TBSCertificate",
            ));
        }

        let serial = tbs.serial_number.as_bytes();
        if serial.is_empty() || serial.len() > MAX_SERIAL_LEN {
            return Err(invalid(cert, "serial number has an invalid length"));
        }
        if serial[0] & 0x80 == 0x80 {
            return Err(invalid(cert, "serial number is negative"));
        }

        if tbs.issuer.0.is_empty() {
            return Err(invalid(cert, "issuer name is empty"));
        }

        for t in [&tbs.validity.not_before, &tbs.validity.not_after] {
            if let Time::GeneralTime(gt) = t {
                if gt.to_date_time().year() < 2050 {
                    return Err(invalid(
                        cert,
                        "GeneralizedTime used for a date that UTCTime can represent",
                    ));
                }
            }
        }

        valid_at_time(tbs, &self.validation_time, true)?;
        Ok(())
    }

    /// `permits_algorithms` checks the certificate's public key and signature algorithm against the
    /// permitted sets.
    pub fn permits_algorithms(&self, cert: &PDVCertificate) -> Result<()> {
        let key_kind = public_key_kind(cert.public_key())?;
        if !self.permitted_public_key_algorithms.contains(&key_kind) {
            return Err(Error::failure(
                PathValidationStatus::ProhibitedAlg,
                format!(
                    "{}: public key algorithm {} is not permitted",
                    name_to_string(cert.subject()),
                    key_kind
                ),
            ));
        }
        let sig_alg = cert.signature_algorithm().oid;
        if !self.permitted_signature_algorithms.contains(&sig_alg) {
            return Err(Error::failure(
                PathValidationStatus::ProhibitedAlg,
                format!(
                    "{}: signature algorithm {} is not permitted",
                    name_to_string(cert.subject()),
                    sig_alg
                ),
            ));
        }
        if sig_alg == PKIXALG_RSASSA_PSS && get_pss_hash_algorithm(cert.signature_algorithm()).is_none()
        {
            return Err(Error::failure(
                PathValidationStatus::ProhibitedAlg,
                format!(
                    "{}: RSASSA-PSS parameters are not permitted",
                    name_to_string(cert.subject())
                ),
            ));
        }
        Ok(())
    }

    /// `permits_key_size` rejects RSA keys whose modulus is smaller than the policy minimum. Keys of
    /// other types are not affected.
    pub fn permits_key_size(&self, spki: &SubjectPublicKeyInfoOwned) -> Result<()> {
        if spki.algorithm.oid != PKIXALG_RSA_ENCRYPTION {
            return Ok(());
        }
        let bits = get_rsa_modulus_bits(spki)?;
        if bits < self.minimum_rsa_modulus {
            return Err(Error::failure(
                PathValidationStatus::ProhibitedKeySize,
                format!(
                    "RSA modulus of {} bits is smaller than the minimum of {} bits",
                    bits, self.minimum_rsa_modulus
                ),
            ));
        }
        Ok(())
    }

    /// `permits_ee` checks the end entity certificate's extKeyUsage extension, if present, against
    /// the policy purpose and, for server verification, that a subjectAltName entry matches the
    /// policy subject.
    pub fn permits_ee(&self, leaf: &PDVCertificate) -> Result<()> {
        if let Some(eku) = leaf.extended_key_usage() {
            if !eku
                .0
                .iter()
                .any(|kp| *kp == self.extended_key_usage || *kp == EKU_ANY)
            {
                return Err(Error::failure(
                    PathValidationStatus::InvalidExtendedKeyUsage,
                    format!(
                        "{} does not permit {}",
                        name_to_string(leaf.subject()),
                        self.extended_key_usage
                    ),
                ));
            }
        }

        if let Some(subject) = &self.subject {
            let matched = match leaf.subject_alt_name() {
                Some(san) => subject.matches(san),
                None => false,
            };
            if !matched {
                return Err(Error::failure(
                    PathValidationStatus::SubjectMismatch,
                    format!(
                        "{} was not issued for {}",
                        name_to_string(leaf.subject()),
                        subject
                    ),
                ));
            }
        }
        Ok(())
    }

    /// `permits_ca` checks that a prospective issuer is a CA whose pathLenConstraint, if any,
    /// accommodates the `current_depth` non-self-issued intermediates below it and, when a keyUsage
    /// extension is present, that keyCertSign is asserted.
    pub fn permits_ca(&self, ca: &PDVCertificate, current_depth: u8) -> Result<()> {
        match ca.basic_constraints() {
            None => {
                return Err(Error::failure(
                    PathValidationStatus::MissingBasicConstraints,
                    format!("{} lacks basicConstraints", name_to_string(ca.subject())),
                ))
            }
            Some(bc) if !bc.ca => {
                return Err(Error::failure(
                    PathValidationStatus::InvalidBasicConstraints,
                    format!("{} is not a CA", name_to_string(ca.subject())),
                ))
            }
            Some(bc) => {
                if let Some(path_len) = bc.path_len_constraint {
                    if current_depth > path_len {
                        return Err(Error::failure(
                            PathValidationStatus::InvalidPathLength,
                            format!(
                                "{} asserts a pathLenConstraint of {} but has {} intermediates below it",
                                name_to_string(ca.subject()),
                                path_len,
                                current_depth
                            ),
                        ));
                    }
                }
            }
        }

        if let Some(ku) = ca.key_usage() {
            if !ku.0.contains(KeyUsages::KeyCertSign) {
                return Err(Error::failure(
                    PathValidationStatus::InvalidKeyUsage,
                    format!("{} lacks keyCertSign", name_to_string(ca.subject())),
                ));
            }
        }
        Ok(())
    }
}
