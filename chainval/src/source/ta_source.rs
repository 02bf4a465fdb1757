//! Provides an immutable, in-memory trust anchor store. The following snip illustrates preparation
//! of a [`Store`] from DER-encoded certificates.
//!
//! ```no_run
//! use chainval::{PDVCertificate, Store};
//!
//! let der_encoded_ta: &[u8] = &[]; // read from a trust bundle
//! let ta = PDVCertificate::try_from(der_encoded_ta).unwrap();
//! let store = Store::new(vec![ta]).unwrap();
//! assert_eq!(store.len(), 1);
//! ```
//!
//! Each certificate supplied to a [`Store`] is treated as a self-contained trust anchor: its subject
//! name and public key are trusted and neither its signature nor its validity period is checked.
//! Cloning a [`Store`] is cheap and clones share the same anchors.

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::{debug, info};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::ext::pkix::NameConstraints;
use x509_cert::name::Name;

use crate::{
    pdv_certificate::PDVCertificate,
    util::error::*,
    util::pdv_utilities::{compare_names, name_to_string},
};

/// A trusted subject name and public key, along with any name constraints asserted by the
/// certificate that conveyed them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustAnchor {
    certificate: PDVCertificate,
}

impl TrustAnchor {
    /// Subject name of the trust anchor
    pub fn subject(&self) -> &Name {
        self.certificate.subject()
    }

    /// Public key of the trust anchor
    pub fn public_key(&self) -> &SubjectPublicKeyInfoOwned {
        self.certificate.public_key()
    }

    /// Name constraints read from the trust anchor certificate, if any
    pub fn name_constraints(&self) -> Option<&NameConstraints> {
        self.certificate.name_constraints()
    }

    /// The certificate the trust anchor was read from
    pub fn certificate(&self) -> &PDVCertificate {
        &self.certificate
    }
}

/// Ordered, deduplicated set of [`TrustAnchor`] values. A Store is never modified after construction.
#[derive(Clone, Debug)]
pub struct Store {
    anchors: Arc<Vec<TrustAnchor>>,
}

impl Store {
    /// Creates a Store from one or more certificates. Certificates that repeat the subject name and
    /// public key of an earlier certificate are dropped, so the first occurrence wins.
    ///
    /// Returns [`ConfigurationError::EmptyTrustStore`] when no certificates are provided.
    pub fn new(certificates: Vec<PDVCertificate>) -> Result<Store> {
        if certificates.is_empty() {
            return Err(Error::Configuration(ConfigurationError::EmptyTrustStore));
        }

        let mut anchors: Vec<TrustAnchor> = Vec::with_capacity(certificates.len());
        for certificate in certificates {
            let duplicate = anchors.iter().any(|ta| {
                ta.subject() == certificate.subject() && ta.public_key() == certificate.public_key()
            });
            if duplicate {
                debug!(
                    "Ignoring duplicate trust anchor for {}",
                    name_to_string(certificate.subject())
                );
                continue;
            }
            anchors.push(TrustAnchor { certificate });
        }
        info!("Initialized trust store with {} anchors", anchors.len());

        Ok(Store {
            anchors: Arc::new(anchors),
        })
    }

    /// Number of trust anchors in the store
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Always false for a successfully constructed store
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Trust anchors in the order they were provided
    pub fn anchors(&self) -> &[TrustAnchor] {
        self.anchors.as_slice()
    }

    /// `get_trust_anchors_by_name` returns the trust anchors whose subject name matches `name`, in
    /// the order they were provided.
    pub fn get_trust_anchors_by_name<'a>(
        &'a self,
        name: &'a Name,
    ) -> impl Iterator<Item = &'a TrustAnchor> + 'a {
        self.anchors
            .iter()
            .filter(move |ta| compare_names(ta.subject(), name))
    }

    /// Returns true if at least one trust anchor's subject name matches the issuer name of `cert`
    pub fn contains_anchor_for(&self, cert: &PDVCertificate) -> bool {
        self.get_trust_anchors_by_name(cert.issuer()).next().is_some()
    }
}
