//! The pki_environment_traits module features type definitions that are used by [`PkiEnvironment`]
//! to provide functionality that supports building and validating X.509 certification paths.

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::util::error::*;
use crate::PkiEnvironment;

/// `VerifySignatureMessage` provides a function signature for implementations that perform signature
/// verification over a message. Implementations return `Ok(())` only when the signature verifies.
/// Implementations that do not support the presented algorithm or key type should return an error
/// so other registered implementations get a chance to answer.
pub type VerifySignatureMessage = fn(
    &PkiEnvironment,
    &[u8],                      // message to hash and verify
    &[u8],                      // signature
    &AlgorithmIdentifierOwned,  // signature algorithm
    &SubjectPublicKeyInfoOwned, // public key
) -> Result<()>;
