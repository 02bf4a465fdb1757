//! Extension validators used by the web PKI extension policy presets. Each is an
//! [`ExtensionValidator`](crate::ExtensionValidator) and is invoked with the extension as found in
//! the certificate, or None if a maybe-present extension is absent.

use alloc::format;

use const_oid::db::rfc5912::{ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_PE_AUTHORITY_INFO_ACCESS};
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::ext::Extension;

use crate::{
    pdv_certificate::PDVCertificate, pdv_extension::*, policy::Policy, util::error::*,
    util::pdv_alg_oids::EKU_ANY, util::pdv_utilities::name_to_string,
};

fn reject(cert: &PDVCertificate, msg: &str) -> Error {
    Error::failure(
        PathValidationStatus::ExtensionPolicyViolation,
        format!("{}: {}", name_to_string(cert.subject()), msg),
    )
}

/// authorityInfoAccess, when present, must feature at least one access description
pub fn common_authority_information_access(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.get_extension(&ID_PE_AUTHORITY_INFO_ACCESS) {
        Some(PDVExtension::AuthorityInfoAccessSyntax(aia)) if !aia.0.is_empty() => Ok(()),
        _ => Err(reject(cert, "authorityInfoAccess is empty")),
    }
}

/// extKeyUsage, when present, must list at least one purpose. In a CA certificate it must also list
/// the policy purpose or anyExtendedKeyUsage, since the CA constrains the purposes of the
/// certificates it issues. End entity purposes are checked by [`Policy::permits_ee`].
pub fn common_extended_key_usage(
    policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    let eku = match cert.extended_key_usage() {
        Some(eku) if !eku.0.is_empty() => eku,
        _ => return Err(reject(cert, "extKeyUsage is empty")),
    };
    let is_ca = matches!(cert.basic_constraints(), Some(bc) if bc.ca);
    if is_ca
        && !eku
            .0
            .iter()
            .any(|kp| *kp == policy.extended_key_usage || *kp == EKU_ANY)
    {
        return Err(reject(
            cert,
            format!("extKeyUsage does not permit {}", policy.extended_key_usage).as_str(),
        ));
    }
    Ok(())
}

/// authorityKeyIdentifier in a CA certificate, when present, must include keyIdentifier and must
/// include both or neither of authorityCertIssuer and authorityCertSerialNumber
pub fn ca_authority_key_identifier(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.get_extension(&ID_CE_AUTHORITY_KEY_IDENTIFIER) {
        Some(PDVExtension::AuthorityKeyIdentifier(akid)) => {
            if akid.key_identifier.is_none() {
                return Err(reject(cert, "authorityKeyIdentifier lacks keyIdentifier"));
            }
            if akid.authority_cert_issuer.is_some() != akid.authority_cert_serial_number.is_some()
            {
                return Err(reject(
                    cert,
                    "authorityKeyIdentifier features only one of authorityCertIssuer and authorityCertSerialNumber",
                ));
            }
            Ok(())
        }
        _ => Err(reject(cert, "authorityKeyIdentifier could not be read")),
    }
}

/// keyUsage in a CA certificate must assert keyCertSign
pub fn ca_key_usage(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.key_usage() {
        Some(ku) if ku.0.contains(KeyUsages::KeyCertSign) => Ok(()),
        _ => Err(reject(cert, "keyUsage does not assert keyCertSign")),
    }
}

/// basicConstraints in a CA certificate must assert cA
pub fn ca_basic_constraints(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.basic_constraints() {
        Some(bc) if bc.ca => Ok(()),
        _ => Err(reject(cert, "basicConstraints does not assert cA")),
    }
}

/// nameConstraints, when present, must feature permittedSubtrees, excludedSubtrees or both
pub fn ca_name_constraints(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.name_constraints() {
        Some(nc) if nc.permitted_subtrees.is_some() || nc.excluded_subtrees.is_some() => Ok(()),
        _ => Err(reject(
            cert,
            "nameConstraints features neither permittedSubtrees nor excludedSubtrees",
        )),
    }
}

/// subjectAltName in an end entity certificate must feature at least one name and must be critical
/// when the subject name is empty
pub fn ee_subject_alt_name(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    let extension = match extension {
        Some(extension) => extension,
        None => return Ok(()),
    };
    match cert.subject_alt_name() {
        Some(san) if !san.0.is_empty() => {}
        _ => return Err(reject(cert, "subjectAltName is empty")),
    }
    if cert.subject().0.is_empty() && !extension.critical {
        return Err(reject(
            cert,
            "subjectAltName must be critical when the subject name is empty",
        ));
    }
    Ok(())
}

/// basicConstraints in an end entity certificate, when present, must not assert cA
pub fn ee_basic_constraints(
    _policy: &Policy,
    cert: &PDVCertificate,
    extension: Option<&Extension>,
) -> Result<()> {
    if extension.is_none() {
        return Ok(());
    }
    match cert.basic_constraints() {
        Some(bc) if bc.ca => Err(reject(cert, "end entity certificate asserts cA")),
        _ => Ok(()),
    }
}
