//! Server and client verifiers. Both are built by [`PolicyBuilder`](crate::PolicyBuilder), are
//! immutable afterwards and may be shared across threads.

use crate::{
    cert_path::{VerifiedClient, VerifiedPath},
    environment::pki_environment::PkiEnvironment,
    extension_policy::ExtensionPolicy,
    validator::path_builder::PathBuilder,
    pdv_certificate::PDVCertificate,
    policy::Policy,
    subject::Subject,
    util::error::*,
    Store, TimeOfInterest,
};

/// Configuration shared by [`ServerVerifier`] and [`ClientVerifier`]
#[derive(Clone)]
pub(crate) struct PathVerifier {
    pub(crate) policy: Policy,
    pub(crate) store: Store,
    pub(crate) ca_extension_policy: ExtensionPolicy,
    pub(crate) ee_extension_policy: ExtensionPolicy,
    pub(crate) pe: PkiEnvironment,
}

impl PathVerifier {
    fn verify(&self, leaf: &PDVCertificate, intermediates: &[PDVCertificate]) -> Result<VerifiedPath> {
        PathBuilder::new(
            &self.pe,
            &self.policy,
            &self.ca_extension_policy,
            &self.store,
            leaf,
            intermediates,
        )
        .build(&self.ee_extension_policy)
    }
}

/// `ServerVerifier` validates certificates presented by a server expected to be named
/// [`ServerVerifier::subject`].
#[derive(Clone)]
pub struct ServerVerifier {
    inner: PathVerifier,
    subject: Subject,
}

impl ServerVerifier {
    pub(crate) fn new(inner: PathVerifier, subject: Subject) -> ServerVerifier {
        ServerVerifier { inner, subject }
    }

    /// `verify` searches for a path from `leaf` to a trust anchor, using `intermediates` as
    /// prospective intermediate CA certificates. Intermediates are considered in the order given.
    pub fn verify(
        &self,
        leaf: &PDVCertificate,
        intermediates: &[PDVCertificate],
    ) -> Result<VerifiedPath> {
        self.inner.verify(leaf, intermediates)
    }

    /// The name the end entity certificate must be issued for
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Time at which certificates are validated
    pub fn validation_time(&self) -> TimeOfInterest {
        self.inner.policy.validation_time
    }

    /// Maximum number of non-self-issued intermediate CA certificates
    pub fn max_chain_depth(&self) -> u8 {
        self.inner.policy.max_chain_depth
    }

    /// Trust anchors
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The parameters used for each verification
    pub fn policy(&self) -> &Policy {
        &self.inner.policy
    }
}

/// `ClientVerifier` validates certificates presented by clients. No particular name is required;
/// the subjectAltName entries of a verified end entity certificate are returned to the caller.
#[derive(Clone)]
pub struct ClientVerifier {
    inner: PathVerifier,
}

impl ClientVerifier {
    pub(crate) fn new(inner: PathVerifier) -> ClientVerifier {
        ClientVerifier { inner }
    }

    /// `verify` searches for a path from `leaf` to a trust anchor as [`ServerVerifier::verify`] does.
    /// If a path is found but the end entity certificate's subjectAltName features an otherName or
    /// ediPartyName, [`Error::UnsupportedGeneralNameType`] is returned.
    pub fn verify(
        &self,
        leaf: &PDVCertificate,
        intermediates: &[PDVCertificate],
    ) -> Result<VerifiedClient> {
        let chain = self.inner.verify(leaf, intermediates)?;
        VerifiedClient::new(chain)
    }

    /// Time at which certificates are validated
    pub fn validation_time(&self) -> TimeOfInterest {
        self.inner.policy.validation_time
    }

    /// Maximum number of non-self-issued intermediate CA certificates
    pub fn max_chain_depth(&self) -> u8 {
        self.inner.policy.max_chain_depth
    }

    /// Trust anchors
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// The parameters used for each verification
    pub fn policy(&self) -> &Policy {
        &self.inner.policy
    }
}

#[test]
fn verifiers_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServerVerifier>();
    assert_send_sync::<ClientVerifier>();
    assert_send_sync::<Store>();
}
