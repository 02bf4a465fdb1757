//! Fluent assembly of verifiers.
//!
//! Every [`PolicyBuilder`] setter takes `&self` and returns a new builder, so partially configured
//! builders can be shared and branched without affecting one another:
//!
//! ```no_run
//! use chainval::*;
//!
//! # fn example(store: Store) -> Result<()> {
//! let base = PolicyBuilder::new()
//!     .store(store)
//!     .time(TimeOfInterest::from_unix_secs(1_700_000_000)?);
//! let shallow = base.max_chain_depth(1);
//!
//! let server = shallow.build_server_verifier(Subject::Dns(DnsName::new("example.com").unwrap()))?;
//! let client = base.build_client_verifier()?;
//! assert_eq!(server.max_chain_depth(), 1);
//! assert_eq!(client.max_chain_depth(), DEFAULT_MAX_CHAIN_DEPTH);
//! # Ok(())
//! # }
//! ```

use der::asn1::ObjectIdentifier;
use log::debug;

use crate::{
    environment::pki_environment::*,
    extension_policy::ExtensionPolicy,
    path_settings::{PathBuildingLimits, PolicySettings},
    policy::*,
    subject::Subject,
    util::error::*,
    util::pdv_alg_oids::{EKU_CLIENT_AUTH, EKU_SERVER_AUTH},
    verifier::*,
    Store, TimeOfInterest,
};

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        fn default_validation_time() -> Result<TimeOfInterest> {
            TimeOfInterest::now().map_err(Error::Asn1Error)
        }
    } else {
        fn default_validation_time() -> Result<TimeOfInterest> {
            Err(Error::Configuration(ConfigurationError::MissingValidationTime))
        }
    }
}

/// Immutable builder for [`ServerVerifier`] and [`ClientVerifier`] values. Options that are not set
/// take the defaults described on each terminal method.
#[derive(Clone, Default)]
pub struct PolicyBuilder {
    time: Option<TimeOfInterest>,
    store: Option<Store>,
    max_chain_depth: Option<u8>,
    ca_extension_policy: Option<ExtensionPolicy>,
    ee_extension_policy: Option<ExtensionPolicy>,
    extended_key_usage: Option<ObjectIdentifier>,
    minimum_rsa_modulus: Option<usize>,
    limits: Option<PathBuildingLimits>,
    pki_environment: Option<PkiEnvironment>,
}

impl PolicyBuilder {
    /// Creates a builder with no options set
    pub fn new() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Sets the validation time
    pub fn time(&self, time: TimeOfInterest) -> PolicyBuilder {
        PolicyBuilder {
            time: Some(time),
            ..self.clone()
        }
    }

    /// Sets the trust anchors
    pub fn store(&self, store: Store) -> PolicyBuilder {
        PolicyBuilder {
            store: Some(store),
            ..self.clone()
        }
    }

    /// Sets the maximum number of non-self-issued intermediate CA certificates
    pub fn max_chain_depth(&self, max_chain_depth: u8) -> PolicyBuilder {
        PolicyBuilder {
            max_chain_depth: Some(max_chain_depth),
            ..self.clone()
        }
    }

    /// Sets the rules applied to intermediate CA certificates
    pub fn ca_extension_policy(&self, policy: ExtensionPolicy) -> PolicyBuilder {
        PolicyBuilder {
            ca_extension_policy: Some(policy),
            ..self.clone()
        }
    }

    /// Sets the rules applied to the end entity certificate
    pub fn ee_extension_policy(&self, policy: ExtensionPolicy) -> PolicyBuilder {
        PolicyBuilder {
            ee_extension_policy: Some(policy),
            ..self.clone()
        }
    }

    /// Sets the purpose the end entity certificate must permit
    pub fn extended_key_usage(&self, eku: ObjectIdentifier) -> PolicyBuilder {
        PolicyBuilder {
            extended_key_usage: Some(eku),
            ..self.clone()
        }
    }

    /// Sets the minimum RSA modulus size in bits
    pub fn minimum_rsa_modulus(&self, bits: usize) -> PolicyBuilder {
        PolicyBuilder {
            minimum_rsa_modulus: Some(bits),
            ..self.clone()
        }
    }

    /// Sets the bounds on path search work
    pub fn limits(&self, limits: PathBuildingLimits) -> PolicyBuilder {
        PolicyBuilder {
            limits: Some(limits),
            ..self.clone()
        }
    }

    /// Sets the environment used to verify signatures. When not set, an environment populated by
    /// [`populate_rust_crypto_pki_environment`] is used.
    pub fn pki_environment(&self, pe: PkiEnvironment) -> PolicyBuilder {
        PolicyBuilder {
            pki_environment: Some(pe),
            ..self.clone()
        }
    }

    /// Applies the options present in `settings`, leaving the others unchanged
    pub fn from_settings(&self, settings: &PolicySettings) -> Result<PolicyBuilder> {
        let mut builder = self.clone();
        if let Some(time) = settings.validation_time {
            builder.time = Some(time);
        }
        if let Some(depth) = settings.max_chain_depth {
            builder.max_chain_depth = Some(depth);
        }
        if let Some(bits) = settings.minimum_rsa_modulus {
            builder.minimum_rsa_modulus = Some(bits);
        }
        if let Some(eku) = settings.extended_key_usage_oid()? {
            builder.extended_key_usage = Some(eku);
        }
        if let Some(limits) = settings.limits {
            builder.limits = Some(limits);
        }
        Ok(builder)
    }

    fn validation_time(&self) -> Result<TimeOfInterest> {
        match self.time {
            Some(time) => Ok(time),
            None => default_validation_time(),
        }
    }

    fn assemble(
        &self,
        subject: Option<Subject>,
        default_eku: ObjectIdentifier,
        default_ee_extension_policy: fn() -> ExtensionPolicy,
    ) -> Result<PathVerifier> {
        let store = match &self.store {
            Some(store) => store.clone(),
            None => return Err(Error::Configuration(ConfigurationError::MissingTrustStore)),
        };
        let policy = Policy::new(
            self.validation_time()?,
            self.max_chain_depth.unwrap_or(DEFAULT_MAX_CHAIN_DEPTH),
            subject,
            self.extended_key_usage.unwrap_or(default_eku),
            self.minimum_rsa_modulus.unwrap_or(DEFAULT_MINIMUM_RSA_MODULUS),
            self.limits.unwrap_or_default(),
        );
        let pe = match &self.pki_environment {
            Some(pe) => pe.clone(),
            None => {
                let mut pe = PkiEnvironment::new();
                populate_rust_crypto_pki_environment(&mut pe);
                pe
            }
        };
        debug!(
            "Building verifier with validation time {} and maximum chain depth {}",
            policy.validation_time, policy.max_chain_depth
        );
        Ok(PathVerifier {
            policy,
            store,
            ca_extension_policy: self
                .ca_extension_policy
                .clone()
                .unwrap_or_else(ExtensionPolicy::webpki_defaults_ca),
            ee_extension_policy: self
                .ee_extension_policy
                .clone()
                .unwrap_or_else(default_ee_extension_policy),
            pe,
        })
    }

    /// Builds a verifier for servers named `subject`.
    ///
    /// A store must have been set. Unset options default as follows: validation time is the current
    /// time (without the `std` feature, an unset time is an error), maximum chain depth is
    /// [`DEFAULT_MAX_CHAIN_DEPTH`], the extended key usage is serverAuth, the minimum RSA modulus is
    /// [`DEFAULT_MINIMUM_RSA_MODULUS`] and the extension policies are
    /// [`ExtensionPolicy::webpki_defaults_ca`] and [`ExtensionPolicy::webpki_defaults_ee`].
    pub fn build_server_verifier(&self, subject: Subject) -> Result<ServerVerifier> {
        let inner = self.assemble(
            Some(subject.clone()),
            EKU_SERVER_AUTH,
            ExtensionPolicy::webpki_defaults_ee,
        )?;
        Ok(ServerVerifier::new(inner, subject))
    }

    /// Builds a verifier for clients. Defaults match [`PolicyBuilder::build_server_verifier`] except
    /// the extended key usage, which is clientAuth, and the end entity extension policy, which is
    /// [`ExtensionPolicy::webpki_defaults_client_ee`] so that certificates without a subjectAltName
    /// extension are accepted.
    pub fn build_client_verifier(&self) -> Result<ClientVerifier> {
        let inner = self.assemble(
            None,
            EKU_CLIENT_AUTH,
            ExtensionPolicy::webpki_defaults_client_ee,
        )?;
        Ok(ClientVerifier::new(inner))
    }
}

#[test]
fn policy_builder_test() {
    let base = PolicyBuilder::new().max_chain_depth(3);
    let deeper = base.max_chain_depth(5);
    assert_eq!(base.max_chain_depth, Some(3));
    assert_eq!(deeper.max_chain_depth, Some(5));

    let time = TimeOfInterest::from_unix_secs(1_700_000_000).unwrap();
    let r = base.time(time).build_client_verifier();
    assert!(matches!(
        r,
        Err(Error::Configuration(ConfigurationError::MissingTrustStore))
    ));

    let settings = PolicySettings {
        max_chain_depth: Some(2),
        minimum_rsa_modulus: Some(3072),
        ..Default::default()
    };
    let configured = base.from_settings(&settings).unwrap();
    assert_eq!(configured.max_chain_depth, Some(2));
    assert_eq!(configured.minimum_rsa_modulus, Some(3072));
    assert_eq!(configured.time, None);
    assert_eq!(base.minimum_rsa_modulus, None);
}
