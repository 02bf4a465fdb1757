//! Error types

use alloc::string::String;
use core::fmt;

use const_oid::ObjectIdentifier;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Reason a candidate certification path was rejected
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PathValidationStatus {
    /// SignatureVerificationFailure occurs when the subject public key of a superior certificate does
    /// not verify the signature of the immediately subordinate certificate.
    SignatureVerificationFailure,
    /// InvalidNotBeforeDate occurs when a certificate contains a notBefore date that is after the
    /// validation time.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a certificate contains a notAfter date that is before the
    /// validation time.
    InvalidNotAfterDate,
    /// MissingBasicConstraints occurs when a prospective intermediate CA certificate does not contain
    /// a basicConstraints extension.
    MissingBasicConstraints,
    /// InvalidBasicConstraints occurs when a prospective intermediate CA certificate contains a
    /// basicConstraints extension with the cA field set to false.
    InvalidBasicConstraints,
    /// InvalidPathLength occurs when a path has more non-self-issued intermediate CA certificates than
    /// allowed by either the maximum chain depth or a pathLenConstraint asserted by a CA certificate.
    InvalidPathLength,
    /// InvalidKeyUsage occurs when an intermediate CA certificate has a keyUsage extension that lacks
    /// keyCertSign.
    InvalidKeyUsage,
    /// InvalidExtendedKeyUsage occurs when the end entity certificate has an extKeyUsage extension that
    /// does not permit the purpose required by the policy.
    InvalidExtendedKeyUsage,
    /// NameConstraintsViolation occurs when a name constraint is violated.
    NameConstraintsViolation,
    /// SubjectMismatch occurs when none of the subjectAltName entries of the end entity certificate
    /// match the subject a server verifier was configured to validate.
    SubjectMismatch,
    /// ExtensionPolicyViolation occurs when a certificate does not satisfy a rule of the extension
    /// policy for its role, including failures signalled by an extension validator.
    ExtensionPolicyViolation,
    /// ProhibitedAlg occurs when an algorithm constraint is violated.
    ProhibitedAlg,
    /// ProhibitedKeySize occurs when a key size constraint is violated.
    ProhibitedKeySize,
    /// InvalidCertificate occurs when a certificate fails a basic structural check (version, serial
    /// number, issuer name, time encoding or algorithm agreement).
    InvalidCertificate,
    /// NoPathsFound occurs when no trust anchor or intermediate CA certificate has a subject name
    /// that matches the issuer name of a certificate on the partial path.
    NoPathsFound,
    /// PathBuildingBudgetExceeded occurs when path building exhausts the configured number of
    /// signature verifications or candidate visits.
    PathBuildingBudgetExceeded,
}

/// Problems detected while assembling a verifier, surfaced immediately to the caller
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigurationError {
    /// A trust store was constructed from an empty set of certificates
    EmptyTrustStore,
    /// An extension policy builder was asked to govern an OID it already governs
    DuplicateExtensionRule(ObjectIdentifier),
    /// A verifier was built without a trust store
    MissingTrustStore,
    /// A verifier was built without a validation time and no clock is available
    MissingValidationTime,
    /// Serialized policy settings could not be parsed
    InvalidSettings,
}

/// Details of the failure that best explains why no valid path was found
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationFailure {
    /// Reason the path was rejected
    pub status: PathValidationStatus,
    /// OID of the extension responsible, if any
    pub oid: Option<ObjectIdentifier>,
    /// Human readable description, usually naming the offending certificate
    pub message: String,
}

impl VerificationFailure {
    /// Creates a new VerificationFailure that is not attributable to a particular extension
    pub fn new(status: PathValidationStatus, message: impl Into<String>) -> Self {
        VerificationFailure {
            status,
            oid: None,
            message: message.into(),
        }
    }

    /// Creates a new VerificationFailure naming the extension that caused it
    pub fn for_extension(
        status: PathValidationStatus,
        oid: ObjectIdentifier,
        message: impl Into<String>,
    ) -> Self {
        VerificationFailure {
            status,
            oid: Some(oid),
            message: message.into(),
        }
    }
}

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A verifier or one of its components was misconfigured
    Configuration(ConfigurationError),
    /// No valid certification path could be found
    VerificationFailure(VerificationFailure),
    /// A valid path was found but the end entity's subjectAltName features a name form that cannot
    /// be surfaced to the caller (otherName or ediPartyName)
    UnsupportedGeneralNameType,
    /// Asn1Error is used to propagate error information from the x509 crate.
    Asn1Error(der::Error),
}

impl Error {
    /// Shorthand for returning a VerificationFailure not attributable to an extension
    pub fn failure(status: PathValidationStatus, message: impl Into<String>) -> Self {
        Error::VerificationFailure(VerificationFailure::new(status, message))
    }

    /// Returns the status associated with a verification failure, if this is one
    pub fn status(&self) -> Option<PathValidationStatus> {
        match self {
            Error::VerificationFailure(vf) => Some(vf.status),
            _ => None,
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Error {
        Error::Configuration(err)
    }
}

impl From<VerificationFailure> for Error {
    fn from(err: VerificationFailure) -> Error {
        Error::VerificationFailure(err)
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
            PathValidationStatus::MissingBasicConstraints => write!(f, "MissingBasicConstraints"),
            PathValidationStatus::InvalidBasicConstraints => write!(f, "InvalidBasicConstraints"),
            PathValidationStatus::InvalidPathLength => write!(f, "InvalidPathLength"),
            PathValidationStatus::InvalidKeyUsage => write!(f, "InvalidKeyUsage"),
            PathValidationStatus::InvalidExtendedKeyUsage => write!(f, "InvalidExtendedKeyUsage"),
            PathValidationStatus::NameConstraintsViolation => write!(f, "NameConstraintsViolation"),
            PathValidationStatus::SubjectMismatch => write!(f, "SubjectMismatch"),
            PathValidationStatus::ExtensionPolicyViolation => write!(f, "ExtensionPolicyViolation"),
            PathValidationStatus::ProhibitedAlg => write!(f, "ProhibitedAlg"),
            PathValidationStatus::ProhibitedKeySize => write!(f, "ProhibitedKeySize"),
            PathValidationStatus::InvalidCertificate => write!(f, "InvalidCertificate"),
            PathValidationStatus::NoPathsFound => write!(f, "NoPathsFound"),
            PathValidationStatus::PathBuildingBudgetExceeded => {
                write!(f, "PathBuildingBudgetExceeded")
            }
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::EmptyTrustStore => write!(f, "trust store contains no anchors"),
            ConfigurationError::DuplicateExtensionRule(oid) => {
                write!(f, "extension {} is already governed by this policy", oid)
            }
            ConfigurationError::MissingTrustStore => write!(f, "no trust store was provided"),
            ConfigurationError::MissingValidationTime => {
                write!(f, "no validation time was provided")
            }
            ConfigurationError::InvalidSettings => write!(f, "policy settings could not be parsed"),
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.oid {
            Some(oid) => write!(f, "{} ({}): {}", self.status, oid, self.message),
            None => write!(f, "{}: {}", self.status, self.message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(err) => write!(f, "ConfigurationError: {}", err),
            Error::VerificationFailure(err) => write!(f, "VerificationFailure: {}", err),
            Error::UnsupportedGeneralNameType => write!(f, "UnsupportedGeneralNameType"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[test]
fn error_test() {
    use alloc::format;

    let _s = format!("{}", PathValidationStatus::SignatureVerificationFailure);
    let _s = format!("{}", PathValidationStatus::InvalidNotBeforeDate);
    let _s = format!("{}", PathValidationStatus::InvalidNotAfterDate);
    let _s = format!("{}", PathValidationStatus::InvalidExtendedKeyUsage);
    let _s = format!("{}", PathValidationStatus::SubjectMismatch);
    let _s = format!("{:?}", PathValidationStatus::PathBuildingBudgetExceeded);

    let oid = const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS;
    let s = format!(
        "{}",
        Error::Configuration(ConfigurationError::DuplicateExtensionRule(oid))
    );
    assert_eq!(
        s,
        "ConfigurationError: extension 2.5.29.19 is already governed by this policy"
    );

    let vf = VerificationFailure::for_extension(
        PathValidationStatus::ExtensionPolicyViolation,
        oid,
        "missing",
    );
    assert_eq!(
        format!("{}", Error::from(vf)),
        "VerificationFailure: ExtensionPolicyViolation (2.5.29.19): missing"
    );
    assert_eq!(
        Error::failure(PathValidationStatus::NoPathsFound, "x").status(),
        Some(PathValidationStatus::NoPathsFound)
    );
    assert_eq!(Error::UnsupportedGeneralNameType.status(), None);
}
