//! PkiEnvironment aggregates the signature verification function pointers used when building and
//! validating a certification path.
//!
//! The sample below illustrates preparation of a PkiEnvironment object for use by a verifier.
//! ```
//! use chainval::*;
//!
//! let mut pe = PkiEnvironment::new();
//! populate_rust_crypto_pki_environment(&mut pe);
//!
//! let builder = PolicyBuilder::new().pki_environment(pe);
//! ```
//!
//! The aggregation of function pointers allows signature verification to vary, i.e., one app may
//! prefer a hardware-backed implementation while another uses the RustCrypto implementations
//! provided by this crate.

use alloc::format;
use alloc::{vec, vec::Vec};

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::{environment::pki_environment_traits::*, util::crypto::*, util::error::*};

/// [`PkiEnvironment`] provides a switchboard of callback functions that allow support to vary on
/// different platforms or to allow support to be tailored for specific use cases.
#[derive(Clone, Default)]
pub struct PkiEnvironment {
    /// List of functions that provide a signature verification functionality given a message
    verify_signature_message_callbacks: Vec<VerifySignatureMessage>,
}

impl PkiEnvironment {
    /// PkiEnvironment::new returns a new [`PkiEnvironment`] with empty callback vectors
    pub fn new() -> PkiEnvironment {
        PkiEnvironment {
            verify_signature_message_callbacks: vec![],
        }
    }

    /// clear_all_callbacks clears the contents of all function pointer vectors associated with an
    /// instance of [`PkiEnvironment`].
    pub fn clear_all_callbacks(&mut self) {
        self.clear_verify_signature_message_callbacks();
    }

    /// add_verify_signature_message_callback adds a [`VerifySignatureMessage`] callback to the list used by verify_signature_message.
    pub fn add_verify_signature_message_callback(&mut self, c: VerifySignatureMessage) {
        self.verify_signature_message_callbacks.push(c);
    }

    /// clear_verify_signature_message_callbacks clears the list of [`VerifySignatureMessage`] callbacks used by verify_signature_message.
    pub fn clear_verify_signature_message_callbacks(&mut self) {
        self.verify_signature_message_callbacks.clear();
    }

    /// verify_signature_message iterates over verify_signature_message_callbacks until an authoritative answer is found
    /// or all options have been exhausted
    pub fn verify_signature_message(
        &self,
        message_to_verify: &[u8],                 // buffer to verify
        signature: &[u8],                         // signature
        signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
        spki: &SubjectPublicKeyInfoOwned,         // public key
    ) -> Result<()> {
        let mut err = None;
        for f in &self.verify_signature_message_callbacks {
            match f(self, message_to_verify, signature, signature_alg, spki) {
                Ok(r) => return Ok(r),
                Err(e) => err = Some(e),
            }
        }
        match err {
            Some(e) => Err(e),
            None => Err(Error::failure(
                PathValidationStatus::SignatureVerificationFailure,
                format!(
                    "no signature verification support registered for {}",
                    signature_alg.oid
                ),
            )),
        }
    }
}

/// `populate_rust_crypto_pki_environment` populates a [`PkiEnvironment`] instance with the
/// [`verify_signature_message_rust_crypto`] callback.
pub fn populate_rust_crypto_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_verify_signature_message_callback(verify_signature_message_rust_crypto);
}
