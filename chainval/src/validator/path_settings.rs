//! Structures and functions related to configuring certification path processing operations
//!
//! [`PolicySettings`] is a serializable form of the options accepted by
//! [`PolicyBuilder`](crate::PolicyBuilder). Every field is optional; absent fields leave the
//! corresponding builder option untouched. Under the `std` feature settings can be read from JSON:
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use chainval::PolicySettings;
//!
//! let json = br#"{"validation_time": 1700000000, "max_chain_depth": 4,
//!                 "limits": {"max_signature_checks": 50, "max_candidates": 500}}"#;
//! let settings = PolicySettings::from_json(json).unwrap();
//! assert_eq!(settings.max_chain_depth, Some(4));
//! # }
//! ```

use alloc::string::String;
use core::str::FromStr;

use der::asn1::ObjectIdentifier;
use serde::{Deserialize, Serialize};

use crate::{util::error::*, TimeOfInterest};

/// Default number of signature verifications a single path search may perform
pub const DEFAULT_MAX_SIGNATURE_CHECKS: usize = 100;

/// Default number of prospective issuers a single path search may consider
pub const DEFAULT_MAX_CANDIDATES: usize = 1024;

/// `PathBuildingLimits` bounds the work done by a single path search. A search that would exceed
/// either limit fails with [`PathValidationStatus::PathBuildingBudgetExceeded`] rather than trying
/// the remaining alternatives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathBuildingLimits {
    /// Maximum number of signature verifications, counting both intermediate and trust anchor keys
    pub max_signature_checks: usize,
    /// Maximum number of prospective issuers examined, counting both intermediates and trust anchors
    pub max_candidates: usize,
}

impl Default for PathBuildingLimits {
    fn default() -> Self {
        PathBuildingLimits {
            max_signature_checks: DEFAULT_MAX_SIGNATURE_CHECKS,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// `PolicySettings` captures verifier options in a form that can be stored as JSON.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Validation time as seconds since the Unix epoch
    pub validation_time: Option<TimeOfInterest>,
    /// Maximum number of non-self-issued intermediate CA certificates
    pub max_chain_depth: Option<u8>,
    /// Minimum RSA modulus size in bits
    pub minimum_rsa_modulus: Option<usize>,
    /// Extended key usage purpose in dotted decimal form
    pub extended_key_usage: Option<String>,
    /// Path building work limits
    pub limits: Option<PathBuildingLimits>,
}

impl PolicySettings {
    /// Parses JSON-encoded settings
    #[cfg(feature = "std")]
    pub fn from_json(json: &[u8]) -> Result<PolicySettings> {
        serde_json::from_slice(json).map_err(|e| {
            log::error!("Failed to parse policy settings: {}", e);
            Error::Configuration(ConfigurationError::InvalidSettings)
        })
    }

    /// Serializes the settings as JSON
    #[cfg(feature = "std")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|_| Error::Configuration(ConfigurationError::InvalidSettings))
    }

    /// Returns the parsed extended key usage purpose, if one was given
    pub fn extended_key_usage_oid(&self) -> Result<Option<ObjectIdentifier>> {
        match &self.extended_key_usage {
            Some(s) => ObjectIdentifier::from_str(s)
                .map(Some)
                .map_err(|_| Error::Configuration(ConfigurationError::InvalidSettings)),
            None => Ok(None),
        }
    }
}

#[cfg(feature = "std")]
#[test]
fn policy_settings_json_test() {
    let json = br#"{"validation_time": 1700000000, "extended_key_usage": "1.3.6.1.5.5.7.3.2",
                    "limits": {"max_signature_checks": 5}}"#;
    let settings = PolicySettings::from_json(json).unwrap();
    assert_eq!(
        settings.validation_time,
        Some(TimeOfInterest::from_unix_secs(1700000000).unwrap())
    );
    assert_eq!(settings.max_chain_depth, None);
    assert_eq!(
        settings.extended_key_usage_oid().unwrap(),
        Some(crate::EKU_CLIENT_AUTH)
    );
    let limits = settings.limits.unwrap();
    assert_eq!(limits.max_signature_checks, 5);
    assert_eq!(limits.max_candidates, DEFAULT_MAX_CANDIDATES);

    let round = PolicySettings::from_json(settings.to_json().unwrap().as_bytes()).unwrap();
    assert_eq!(round, settings);

    assert_eq!(
        PolicySettings::from_json(b"{\"max_chain_depth\": -1}"),
        Err(Error::Configuration(ConfigurationError::InvalidSettings))
    );
    let bad_oid = PolicySettings {
        extended_key_usage: Some("not an oid".into()),
        ..Default::default()
    };
    assert!(bad_oid.extended_key_usage_oid().is_err());
}
