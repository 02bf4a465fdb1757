//! Declarative rules governing the extensions of certificates in one role (CA or end entity).
//!
//! An [`ExtensionPolicy`] maps extension OIDs to an [`ExtensionRule`] stating whether the extension
//! must be absent, may be present or must be present, what its critical flag must be and,
//! optionally, an [`ExtensionValidator`] that inspects its content. Extensions that no rule governs
//! are accepted without inspection.
//!
//! ```
//! use chainval::*;
//! use const_oid::db::rfc5912::{ID_CE_BASIC_CONSTRAINTS, ID_CE_KEY_USAGE};
//!
//! let policy = ExtensionPolicyBuilder::new()
//!     .must_be_present(ID_CE_BASIC_CONSTRAINTS, Criticality::Critical, None)
//!     .and_then(|b| b.maybe_present(ID_CE_KEY_USAGE, Criticality::Agnostic, None))
//!     .map(|b| b.build())
//!     .unwrap();
//! assert_eq!(policy.rules().len(), 2);
//!
//! // governing an OID twice is ambiguous
//! let r = ExtensionPolicyBuilder::new()
//!     .not_present(ID_CE_KEY_USAGE)
//!     .and_then(|b| b.maybe_present(ID_CE_KEY_USAGE, Criticality::Agnostic, None));
//! assert!(r.is_err());
//! ```
//!
//! The web PKI presets are defined as data in [`WEBPKI_COMMON_RULES`], [`WEBPKI_CA_RULES`],
//! [`WEBPKI_EE_RULES`] and [`WEBPKI_CLIENT_EE_RULES`].

use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_NAME_CONSTRAINTS, ID_CE_POLICY_CONSTRAINTS, ID_CE_SUBJECT_ALT_NAME,
    ID_CE_SUBJECT_KEY_IDENTIFIER, ID_PE_AUTHORITY_INFO_ACCESS,
};
use der::asn1::ObjectIdentifier;
use x509_cert::ext::Extension;

use crate::{
    extension_validators::*,
    pdv_certificate::PDVCertificate,
    policy::Policy,
    util::error::*,
    util::pdv_alg_oids::PKIX_CE_SUBJECT_DIRECTORY_ATTRIBUTES,
    util::pdv_utilities::name_to_string,
};

/// Constraint on the critical flag of an extension
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Criticality {
    /// The extension must be marked critical
    Critical,
    /// The extension must not be marked critical
    NonCritical,
    /// Either value is accepted
    Agnostic,
}

impl Criticality {
    /// Returns true if an extension with the given critical flag satisfies this constraint
    pub fn permits(&self, critical: bool) -> bool {
        match self {
            Criticality::Critical => critical,
            Criticality::NonCritical => !critical,
            Criticality::Agnostic => true,
        }
    }
}

/// Whether an extension may appear in a certificate
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// The extension must be absent
    NotPresent,
    /// The extension may be absent or present
    MaybePresent,
    /// The extension must be present
    MustBePresent,
}

/// `ExtensionValidator` inspects the content of a governed extension. The extension argument is None
/// when a maybe-present extension is absent. Returning an error rejects the certificate; the path
/// builder then tries other candidates.
///
/// Any function or closure with a matching signature is an `ExtensionValidator`.
pub trait ExtensionValidator: Send + Sync {
    /// Validates the extension as it appears in `cert`
    fn validate(
        &self,
        policy: &Policy,
        cert: &PDVCertificate,
        extension: Option<&Extension>,
    ) -> Result<()>;
}

impl<F> ExtensionValidator for F
where
    F: Fn(&Policy, &PDVCertificate, Option<&Extension>) -> Result<()> + Send + Sync,
{
    fn validate(
        &self,
        policy: &Policy,
        cert: &PDVCertificate,
        extension: Option<&Extension>,
    ) -> Result<()> {
        self(policy, cert, extension)
    }
}

/// Shared handle to an [`ExtensionValidator`]
pub type ValidatorRef = Arc<dyn ExtensionValidator>;

/// The rule governing one extension
#[derive(Clone)]
pub struct ExtensionRule {
    /// Extension the rule governs
    pub oid: ObjectIdentifier,
    /// Whether the extension may appear
    pub disposition: Disposition,
    /// Constraint on the critical flag, when the extension is present
    pub criticality: Criticality,
    /// Optional content check
    pub validator: Option<ValidatorRef>,
}

impl fmt::Debug for ExtensionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRule")
            .field("oid", &self.oid)
            .field("disposition", &self.disposition)
            .field("criticality", &self.criticality)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Function pointer form of [`ExtensionValidator`] used by the preset tables
pub type ValidatorFn = fn(&Policy, &PDVCertificate, Option<&Extension>) -> Result<()>;

/// Row of a preset rule table: OID, disposition, criticality and optional validator
pub type RuleTableEntry = (
    ObjectIdentifier,
    Disposition,
    Criticality,
    Option<ValidatorFn>,
);

/// Rules shared by the CA and end entity web PKI presets
pub const WEBPKI_COMMON_RULES: &[RuleTableEntry] = &[
    (
        PKIX_CE_SUBJECT_DIRECTORY_ATTRIBUTES,
        Disposition::MaybePresent,
        Criticality::NonCritical,
        None,
    ),
    (
        ID_PE_AUTHORITY_INFO_ACCESS,
        Disposition::MaybePresent,
        Criticality::NonCritical,
        Some(common_authority_information_access),
    ),
    (
        ID_CE_EXT_KEY_USAGE,
        Disposition::MaybePresent,
        Criticality::NonCritical,
        Some(common_extended_key_usage),
    ),
];

/// Rules applied to intermediate CA certificates by [`ExtensionPolicy::webpki_defaults_ca`]
pub const WEBPKI_CA_RULES: &[RuleTableEntry] = &[
    (
        ID_CE_AUTHORITY_KEY_IDENTIFIER,
        Disposition::MaybePresent,
        Criticality::NonCritical,
        Some(ca_authority_key_identifier),
    ),
    (
        ID_CE_SUBJECT_KEY_IDENTIFIER,
        Disposition::MaybePresent,
        Criticality::NonCritical,
        None,
    ),
    (
        ID_CE_KEY_USAGE,
        Disposition::MustBePresent,
        Criticality::Agnostic,
        Some(ca_key_usage),
    ),
    (
        ID_CE_BASIC_CONSTRAINTS,
        Disposition::MustBePresent,
        Criticality::Critical,
        Some(ca_basic_constraints),
    ),
    (
        ID_CE_NAME_CONSTRAINTS,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        Some(ca_name_constraints),
    ),
    (
        ID_CE_POLICY_CONSTRAINTS,
        Disposition::MaybePresent,
        Criticality::Critical,
        None,
    ),
];

/// Rules applied to end entity certificates by [`ExtensionPolicy::webpki_defaults_ee`]
pub const WEBPKI_EE_RULES: &[RuleTableEntry] = &[
    (
        ID_CE_AUTHORITY_KEY_IDENTIFIER,
        Disposition::MustBePresent,
        Criticality::NonCritical,
        None,
    ),
    (
        ID_CE_KEY_USAGE,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        None,
    ),
    (
        ID_CE_SUBJECT_ALT_NAME,
        Disposition::MustBePresent,
        Criticality::Agnostic,
        Some(ee_subject_alt_name),
    ),
    (
        ID_CE_BASIC_CONSTRAINTS,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        Some(ee_basic_constraints),
    ),
    (
        ID_CE_NAME_CONSTRAINTS,
        Disposition::NotPresent,
        Criticality::Agnostic,
        None,
    ),
];

/// Rules applied to end entity certificates by [`ExtensionPolicy::webpki_defaults_client_ee`]. These
/// differ from [`WEBPKI_EE_RULES`] only in permitting subjectAltName to be absent, since a client
/// need not be named.
pub const WEBPKI_CLIENT_EE_RULES: &[RuleTableEntry] = &[
    (
        ID_CE_AUTHORITY_KEY_IDENTIFIER,
        Disposition::MustBePresent,
        Criticality::NonCritical,
        None,
    ),
    (
        ID_CE_KEY_USAGE,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        None,
    ),
    (
        ID_CE_SUBJECT_ALT_NAME,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        Some(ee_subject_alt_name),
    ),
    (
        ID_CE_BASIC_CONSTRAINTS,
        Disposition::MaybePresent,
        Criticality::Agnostic,
        Some(ee_basic_constraints),
    ),
    (
        ID_CE_NAME_CONSTRAINTS,
        Disposition::NotPresent,
        Criticality::Agnostic,
        None,
    ),
];

/// Accumulates [`ExtensionRule`] values. Each method consumes the builder and returns a new one, or
/// a [`ConfigurationError::DuplicateExtensionRule`] if the OID is already governed.
#[derive(Clone, Debug, Default)]
pub struct ExtensionPolicyBuilder {
    rules: Vec<ExtensionRule>,
}

impl ExtensionPolicyBuilder {
    /// Creates a builder with no rules
    pub fn new() -> Self {
        ExtensionPolicyBuilder::default()
    }

    fn add(
        mut self,
        oid: ObjectIdentifier,
        disposition: Disposition,
        criticality: Criticality,
        validator: Option<ValidatorRef>,
    ) -> Result<Self> {
        if self.rules.iter().any(|r| r.oid == oid) {
            return Err(Error::Configuration(
                ConfigurationError::DuplicateExtensionRule(oid),
            ));
        }
        self.rules.push(ExtensionRule {
            oid,
            disposition,
            criticality,
            validator,
        });
        Ok(self)
    }

    fn add_table(self, table: &[RuleTableEntry]) -> Result<Self> {
        table
            .iter()
            .try_fold(self, |builder, (oid, disposition, criticality, validator)| {
                let validator = validator.map(|v| Arc::new(v) as ValidatorRef);
                builder.add(*oid, *disposition, *criticality, validator)
            })
    }

    /// Requires the extension to be absent
    pub fn not_present(self, oid: ObjectIdentifier) -> Result<Self> {
        self.add(oid, Disposition::NotPresent, Criticality::Agnostic, None)
    }

    /// Permits the extension, subject to `criticality` when present. The validator, if any, is
    /// called whether or not the extension is present.
    pub fn maybe_present(
        self,
        oid: ObjectIdentifier,
        criticality: Criticality,
        validator: Option<ValidatorRef>,
    ) -> Result<Self> {
        self.add(oid, Disposition::MaybePresent, criticality, validator)
    }

    /// Requires the extension, subject to `criticality`
    pub fn must_be_present(
        self,
        oid: ObjectIdentifier,
        criticality: Criticality,
        validator: Option<ValidatorRef>,
    ) -> Result<Self> {
        self.add(oid, Disposition::MustBePresent, criticality, validator)
    }

    /// Freezes the rules
    pub fn build(self) -> ExtensionPolicy {
        ExtensionPolicy {
            rules: Arc::new(self.rules),
        }
    }
}

/// A frozen set of [`ExtensionRule`] values for one certificate role
#[derive(Clone, Debug)]
pub struct ExtensionPolicy {
    rules: Arc<Vec<ExtensionRule>>,
}

impl ExtensionPolicy {
    /// A policy with no rules: every extension, recognized or not, is accepted unchecked
    pub fn permit_all() -> ExtensionPolicy {
        ExtensionPolicyBuilder::new().build()
    }

    /// Builds a policy from one or more preset tables
    pub fn from_tables(tables: &[&[RuleTableEntry]]) -> Result<ExtensionPolicy> {
        tables
            .iter()
            .try_fold(ExtensionPolicyBuilder::new(), |b, t| b.add_table(t))
            .map(|b| b.build())
    }

    /// CA/Browser Forum oriented rules for intermediate CA certificates ([`WEBPKI_COMMON_RULES`] and
    /// [`WEBPKI_CA_RULES`])
    pub fn webpki_defaults_ca() -> ExtensionPolicy {
        Self::preset(WEBPKI_CA_RULES)
    }

    /// CA/Browser Forum oriented rules for end entity certificates ([`WEBPKI_COMMON_RULES`] and
    /// [`WEBPKI_EE_RULES`])
    pub fn webpki_defaults_ee() -> ExtensionPolicy {
        Self::preset(WEBPKI_EE_RULES)
    }

    /// Rules for end entity certificates presented by clients ([`WEBPKI_COMMON_RULES`] and
    /// [`WEBPKI_CLIENT_EE_RULES`])
    pub fn webpki_defaults_client_ee() -> ExtensionPolicy {
        Self::preset(WEBPKI_CLIENT_EE_RULES)
    }

    fn preset(role_rules: &'static [RuleTableEntry]) -> ExtensionPolicy {
        let rules = WEBPKI_COMMON_RULES
            .iter()
            .chain(role_rules.iter())
            .map(|(oid, disposition, criticality, validator)| ExtensionRule {
                oid: *oid,
                disposition: *disposition,
                criticality: *criticality,
                validator: validator.map(|v| Arc::new(v) as ValidatorRef),
            })
            .collect();
        ExtensionPolicy {
            rules: Arc::new(rules),
        }
    }

    /// The rules in the order they were added
    pub fn rules(&self) -> &[ExtensionRule] {
        self.rules.as_slice()
    }

    /// Returns the rule governing `oid`, if any
    pub fn rule(&self, oid: &ObjectIdentifier) -> Option<&ExtensionRule> {
        self.rules.iter().find(|r| r.oid == *oid)
    }

    /// `permits` evaluates every rule against `cert`. The first violated rule is reported as a
    /// [`PathValidationStatus::ExtensionPolicyViolation`] naming the extension; failures reported by
    /// validators are reported the same way with the validator's message.
    pub fn permits(&self, policy: &Policy, cert: &PDVCertificate) -> Result<()> {
        for rule in self.rules.iter() {
            let violation = |msg: &str| {
                Error::VerificationFailure(VerificationFailure::for_extension(
                    PathValidationStatus::ExtensionPolicyViolation,
                    rule.oid,
                    format!("{}: {}", name_to_string(cert.subject()), msg),
                ))
            };

            let ext = cert.find_extension(&rule.oid)?;
            match (rule.disposition, ext) {
                (Disposition::NotPresent, Some(_)) => {
                    return Err(violation("extension must not be present"))
                }
                (Disposition::MustBePresent, None) => {
                    return Err(violation("required extension is absent"))
                }
                (_, Some(ext)) if !rule.criticality.permits(ext.critical) => {
                    return Err(violation(if ext.critical {
                        "extension must not be marked critical"
                    } else {
                        "extension must be marked critical"
                    }))
                }
                _ => {}
            }

            if rule.disposition == Disposition::NotPresent {
                continue;
            }
            if let Some(validator) = &rule.validator {
                if let Err(e) = validator.validate(policy, cert, ext) {
                    return Err(match e {
                        Error::VerificationFailure(mut vf) => {
                            vf.status = PathValidationStatus::ExtensionPolicyViolation;
                            vf.oid = Some(rule.oid);
                            Error::VerificationFailure(vf)
                        }
                        other => violation(format!("validator failed: {}", other).as_str()),
                    });
                }
            }
        }
        Ok(())
    }
}

#[test]
fn criticality_test() {
    assert!(Criticality::Critical.permits(true));
    assert!(!Criticality::Critical.permits(false));
    assert!(Criticality::NonCritical.permits(false));
    assert!(!Criticality::NonCritical.permits(true));
    assert!(Criticality::Agnostic.permits(true));
    assert!(Criticality::Agnostic.permits(false));
}

#[test]
fn presets_test() {
    let ca = ExtensionPolicy::webpki_defaults_ca();
    assert_eq!(
        ca.rules().len(),
        WEBPKI_COMMON_RULES.len() + WEBPKI_CA_RULES.len()
    );
    let bc = ca.rule(&ID_CE_BASIC_CONSTRAINTS).unwrap();
    assert_eq!(bc.disposition, Disposition::MustBePresent);
    assert_eq!(bc.criticality, Criticality::Critical);
    assert!(bc.validator.is_some());

    let ee = ExtensionPolicy::webpki_defaults_ee();
    assert_eq!(
        ee.rule(&ID_CE_NAME_CONSTRAINTS).unwrap().disposition,
        Disposition::NotPresent
    );
    let client = ExtensionPolicy::webpki_defaults_client_ee();
    let san = client.rule(&ID_CE_SUBJECT_ALT_NAME).unwrap();
    assert_eq!(san.disposition, Disposition::MaybePresent);
    assert!(san.validator.is_some());
    assert_eq!(
        ee.rule(&ID_CE_SUBJECT_ALT_NAME).unwrap().disposition,
        Disposition::MustBePresent
    );
    assert!(ExtensionPolicy::permit_all().rules().is_empty());
    assert!(ExtensionPolicy::from_tables(&[WEBPKI_CA_RULES, WEBPKI_CA_RULES]).is_err());
}
