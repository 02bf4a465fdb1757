//! Utility functions that support certification path processing

use alloc::format;
use alloc::string::{String, ToString};

use log::{debug, error};

#[cfg(feature = "std")]
use lazy_static::lazy_static;

#[cfg(feature = "std")]
use regex::Regex;

use der::asn1::{Ia5String, PrintableString, Utf8StringRef};
use der::{Encode, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;
use x509_cert::{Certificate, TbsCertificate};

use crate::{pdv_certificate::PDVCertificate, util::error::*, TimeOfInterest};

/// `is_self_issued` returns true if the subject field in the certificate is the same as the issuer
/// field.
pub fn is_self_issued(cert: &Certificate) -> bool {
    compare_names(&cert.tbs_certificate.issuer, &cert.tbs_certificate.subject)
}

/// `valid_at_time` evaluates the not_before and not_after fields of the given TBSCertificate instance
/// and provides an indication of validity relative to presented time of interest.
///
/// It returns the number of seconds left to live if the certificate is valid at the given time or
/// an error indicating which field failed if the certificate is not valid. The not_before field is
/// evaluated first. Both bounds are inclusive.
///
/// To stifle logging output upon error, pass true for the stifle_log parameter.
pub fn valid_at_time(target: &TbsCertificate, toi: &TimeOfInterest, stifle_log: bool) -> Result<u64> {
    let toi = toi.as_unix_secs();

    let nb = target.validity.not_before.to_unix_duration().as_secs();
    if nb > toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                "certificate is not yet valid, i.e., not_before is after the validation time",
            );
        }
        return Err(Error::failure(
            PathValidationStatus::InvalidNotBeforeDate,
            format!(
                "{} is not valid before {}",
                name_to_string(&target.subject),
                target.validity.not_before
            ),
        ));
    }

    let na = target.validity.not_after.to_unix_duration().as_secs();
    if na < toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                format!(
                    "certificate is expired relative to the validation time: {}",
                    target.validity.not_after
                )
                .as_str(),
            );
        }
        Err(Error::failure(
            PathValidationStatus::InvalidNotAfterDate,
            format!(
                "{} expired at {}",
                name_to_string(&target.subject),
                target.validity.not_after
            ),
        ))
    } else {
        Ok(na - toi)
    }
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    let name_str = name_to_string(name);
    error!(
        "Encountered error while processing certificate with subject {}: {}",
        name_str, msg
    );
}

pub(crate) fn log_debug_for_ca(ca: &PDVCertificate, msg: &str) {
    debug!(
        "Rejected candidate with subject {}: {}",
        name_to_string(ca.subject()),
        msg
    );
}

/// `name_to_string` returns the RFC 4514 string form of a Name for use in log output and diagnostics
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// get_value_from_rdn returns the value from AttributeTypeAndValue as a string for use in comparing
/// values where leading whitespace may be a factor
pub fn get_value_from_rdn(atav: &AttributeTypeAndValue) -> Result<String> {
    let val = match atav.value.tag() {
        der::Tag::PrintableString => atav
            .value
            .decode_as()
            .ok()
            .map(|s: PrintableString| s.to_string()),
        der::Tag::Utf8String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Utf8StringRef<'_>| s.to_string()),
        der::Tag::Ia5String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Ia5String| s.to_string()),
        _ => None,
    };

    match val {
        Some(val) => Ok(val),
        None => {
            // opaque values compare by encoding
            let enc = atav.value.to_der()?;
            let mut s = format!("{}=#", atav.oid);
            for c in enc {
                s.push_str(format!("{:02x}", c).as_str());
            }
            Ok(s)
        }
    }
}

/// Lowercases and trims a string value and collapses internal runs of whitespace to a single space
fn normalize_value(value: &str) -> String {
    #[cfg(feature = "std")]
    {
        lazy_static! {
            static ref WHITESPACE_RE: Option<Regex> = Regex::new(r"\s+").ok();
        }
        let trimmed = value.trim().to_lowercase();
        match WHITESPACE_RE.as_ref() {
            Some(re) => re.replace_all(trimmed.as_str(), " ").to_string(),
            None => trimmed,
        }
    }
    #[cfg(not(feature = "std"))]
    {
        let mut s = String::new();
        for word in value.split_whitespace() {
            if !s.is_empty() {
                s.push(' ');
            }
            s.push_str(word.to_lowercase().as_str());
        }
        s
    }
}

/// [`compare_names`] compares two Name values returning true if they match and false otherwise.
///
/// Names match when they have the same RDN structure and every attribute has the same type and a
/// value that is equal after case folding and whitespace normalization.
pub fn compare_names(left: &Name, right: &Name) -> bool {
    // no match if not the same number of RDNs
    if left.0.len() != right.0.len() {
        return false;
    }

    for (lrdn, rrdn) in left.0.iter().zip(right.0.iter()) {
        if lrdn.0.len() != rrdn.0.len() {
            return false;
        }

        if lrdn == rrdn {
            continue;
        }

        for (l, r) in lrdn.0.iter().zip(rrdn.0.iter()) {
            if l.oid != r.oid {
                return false;
            }

            let (l_val, r_val) = match (get_value_from_rdn(l), get_value_from_rdn(r)) {
                (Ok(l_val), Ok(r_val)) => (l_val, r_val),
                _ => return false,
            };

            if normalize_value(&l_val) != normalize_value(&r_val) {
                return false;
            }
        }
    }
    true
}

#[test]
fn compare_names_test() {
    use core::str::FromStr;

    let a = Name::from_str("CN=Test  CA,O=Example").unwrap();
    let b = Name::from_str("CN=test ca,O=EXAMPLE").unwrap();
    let c = Name::from_str("CN=Other CA,O=Example").unwrap();
    let d = Name::from_str("CN=Test CA").unwrap();
    assert!(compare_names(&a, &a));
    assert!(compare_names(&a, &b));
    assert!(!compare_names(&a, &c));
    assert!(!compare_names(&a, &d));
}

#[test]
fn normalize_value_test() {
    assert_eq!(normalize_value("  Some \t Value "), "some value");
    assert_eq!(normalize_value("x"), "x");
}
