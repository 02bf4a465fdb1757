//! Provides implementations of crypto-related [`PkiEnvironment`] interfaces using libraries from the
//! [Rust Crypto](https://github.com/RustCrypto) project for support.

use alloc::format;
use alloc::vec::Vec;

use der::{asn1::ObjectIdentifier, Decode, Encode};
use p256::ecdsa::{
    signature::hazmat::PrehashVerifier, Signature as Signature256, VerifyingKey as VerifyingKey256,
};
use p384::ecdsa::{Signature as Signature384, VerifyingKey as VerifyingKey384};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, Pss, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::util::error::{Error, PathValidationStatus, Result};
use crate::{environment::pki_environment::*, log_message, util::pdv_alg_oids::*, PeLogLevels};

/// SHA-2 digest algorithms used with the supported signature algorithms
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    // final arc of the id-sha256/384/512 OIDs under 2.16.840.1.101.3.4.2
    fn arc(self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => 1,
            HashAlgorithm::Sha384 => 2,
            HashAlgorithm::Sha512 => 3,
        }
    }

    fn output_len(self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

/// DER encoding of RSASSA-PSS-params naming `hash` as both the message digest and the MGF1 digest,
/// with a salt as long as the digest output and the default trailer field.
fn pss_params_encoding(hash: HashAlgorithm) -> [u8; 54] {
    let h = hash.arc();
    [
        0x30, 0x34, // RSASSA-PSS-params
        0xa0, 0x0f, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, h,
        0x05, 0x00, // [0] hashAlgorithm
        0xa1, 0x1c, 0x30, 0x1a, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x08,
        0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, h, 0x05,
        0x00, // [1] maskGenAlgorithm: id-mgf1 with the same digest
        0xa2, 0x03, 0x02, 0x01, hash.output_len(), // [2] saltLength
    ]
}

/// get_pss_hash_algorithm returns the digest used by an id-RSASSA-PSS algorithm identifier when its
/// parameters are exactly one of the SHA-256, SHA-384 or SHA-512 profiles, i.e., the same digest for
/// the message and MGF1 and a salt as long as the digest. Any other parameters yield None.
pub fn get_pss_hash_algorithm(alg_id: &AlgorithmIdentifierOwned) -> Option<HashAlgorithm> {
    if alg_id.oid != PKIXALG_RSASSA_PSS {
        return None;
    }
    let params = alg_id.parameters.as_ref()?.to_der().ok()?;
    [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ]
    .into_iter()
    .find(|hash| params.as_slice() == pss_params_encoding(*hash).as_slice())
}

/// is_rsa returns true is the presented OID is one of [`PKIXALG_SHA256_WITH_RSA_ENCRYPTION`],
/// [`PKIXALG_SHA384_WITH_RSA_ENCRYPTION`], [`PKIXALG_SHA512_WITH_RSA_ENCRYPTION`] or
/// [`PKIXALG_RSASSA_PSS`] and false otherwise.
pub(crate) fn is_rsa(oid: &ObjectIdentifier) -> bool {
    *oid == PKIXALG_SHA256_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA384_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA512_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_RSASSA_PSS
}

/// ecdsa_hash_algorithm returns the digest named by one of [`PKIXALG_ECDSA_WITH_SHA256`],
/// [`PKIXALG_ECDSA_WITH_SHA384`] or [`PKIXALG_ECDSA_WITH_SHA512`] and None otherwise.
pub(crate) fn ecdsa_hash_algorithm(oid: &ObjectIdentifier) -> Option<HashAlgorithm> {
    match *oid {
        PKIXALG_ECDSA_WITH_SHA256 => Some(HashAlgorithm::Sha256),
        PKIXALG_ECDSA_WITH_SHA384 => Some(HashAlgorithm::Sha384),
        PKIXALG_ECDSA_WITH_SHA512 => Some(HashAlgorithm::Sha512),
        _ => None,
    }
}

fn signature_failure() -> Error {
    Error::failure(
        PathValidationStatus::SignatureVerificationFailure,
        "signature did not verify",
    )
}

fn unsupported(message: &str) -> Error {
    log_message(&PeLogLevels::PeError, message);
    Error::failure(PathValidationStatus::ProhibitedAlg, message)
}

/// get_named_curve_parameter returns the namedCurve OID from the parameters of an id-ecPublicKey
/// algorithm identifier.
pub fn get_named_curve_parameter(alg_id: &AlgorithmIdentifierOwned) -> Result<ObjectIdentifier> {
    if let Some(params) = &alg_id.parameters {
        if let Ok(oid) = params.decode_as::<ObjectIdentifier>() {
            return Ok(oid);
        }
    }
    Err(Error::failure(
        PathValidationStatus::ProhibitedAlg,
        "public key does not name a curve",
    ))
}

/// get_rsa_modulus_bits returns the size in bits of the modulus of an RSA public key
pub fn get_rsa_modulus_bits(spki: &SubjectPublicKeyInfoOwned) -> Result<usize> {
    let key = rsa::pkcs1::RsaPublicKey::from_der(spki.subject_public_key.raw_bytes())?;
    let modulus = key.modulus.as_bytes();
    match modulus.first() {
        Some(first) => Ok((modulus.len() - 1) * 8 + (8 - first.leading_zeros() as usize)),
        None => Ok(0),
    }
}

fn verify_rsa(
    message_to_verify: &[u8],
    signature: &[u8],
    signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<()> {
    let enc_spki = spki.to_der()?;
    let rsa = RsaPublicKey::from_public_key_der(&enc_spki)
        .map_err(|_| unsupported("failed to parse RSA public key"))?;
    let r = match signature_alg.oid {
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION => rsa.verify(
            Pkcs1v15Sign::new::<Sha256>(),
            &Sha256::digest(message_to_verify),
            signature,
        ),
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION => rsa.verify(
            Pkcs1v15Sign::new::<Sha384>(),
            &Sha384::digest(message_to_verify),
            signature,
        ),
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION => rsa.verify(
            Pkcs1v15Sign::new::<Sha512>(),
            &Sha512::digest(message_to_verify),
            signature,
        ),
        _ => {
            let hash = get_pss_hash_algorithm(signature_alg)
                .ok_or_else(|| unsupported("unsupported RSASSA-PSS parameters"))?;
            let salt_len = hash.output_len() as usize;
            let scheme = match hash {
                HashAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
                HashAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
                HashAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
            };
            rsa.verify(scheme, &hash.digest(message_to_verify), signature)
        }
    };
    r.map_err(|_| signature_failure())
}

fn verify_ecdsa(
    message_to_verify: &[u8],
    signature: &[u8],
    hash: HashAlgorithm,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<()> {
    let named_curve = get_named_curve_parameter(&spki.algorithm)?;
    let key_bytes = spki.subject_public_key.raw_bytes();
    let prehash = hash.digest(message_to_verify);

    match named_curve {
        PKIXALG_SECP256R1 => {
            let ecdsa = VerifyingKey256::from_sec1_bytes(key_bytes)
                .map_err(|_| unsupported("failed to parse P-256 public key"))?;
            let s = Signature256::from_der(signature).map_err(|_| signature_failure())?;
            ecdsa.verify_prehash(&prehash, &s).map_err(|_| signature_failure())
        }
        PKIXALG_SECP384R1 => {
            let ecdsa = VerifyingKey384::from_sec1_bytes(key_bytes)
                .map_err(|_| unsupported("failed to parse P-384 public key"))?;
            let s = Signature384::from_der(signature).map_err(|_| signature_failure())?;
            ecdsa.verify_prehash(&prehash, &s).map_err(|_| signature_failure())
        }
        _ => Err(unsupported(
            format!("Unsupported named curve {}", named_curve).as_str(),
        )),
    }
}

/// verify_signature_message_rust_crypto implements the [`VerifySignatureMessage`](crate::VerifySignatureMessage) interface for [`PkiEnvironment`] using
/// implementations from the [Rust Crypto](https://github.com/RustCrypto) project.
///
/// RSA PKCS #1 v1.5 signatures with SHA-256, SHA-384 or SHA-512 are supported, as are RSASSA-PSS
/// signatures whose parameters are accepted by [`get_pss_hash_algorithm`]. ECDSA signatures with
/// SHA-256, SHA-384 or SHA-512 are supported for P-256 and P-384 keys.
pub fn verify_signature_message_rust_crypto(
    _pe: &PkiEnvironment,
    message_to_verify: &[u8],                 // buffer to verify
    signature: &[u8],                         // signature
    signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
    spki: &SubjectPublicKeyInfoOwned,         // public key
) -> Result<()> {
    if is_rsa(&signature_alg.oid) {
        return verify_rsa(message_to_verify, signature, signature_alg, spki);
    }
    if let Some(hash) = ecdsa_hash_algorithm(&signature_alg.oid) {
        return verify_ecdsa(message_to_verify, signature, hash, spki);
    }
    Err(unsupported(
        format!("Unrecognized signature algorithm: {}", signature_alg.oid).as_str(),
    ))
}

#[test]
fn test_verify_signature_message_p256() {
    use der::asn1::BitString;
    use p256::ecdsa::{
        signature::{hazmat::PrehashSigner, Signer},
        SigningKey,
    };

    let signing_key = SigningKey::from_slice(&[7u8; 32]).unwrap();
    let verifying_key = signing_key.verifying_key();
    let message = b"to be signed";
    let sig: Signature256 = signing_key.sign(message);
    let sig = sig.to_der();

    let spki = SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_EC_PUBLIC_KEY,
            parameters: Some(der::Any::encode_from(&PKIXALG_SECP256R1).unwrap()),
        },
        subject_public_key: BitString::from_bytes(
            verifying_key.to_encoded_point(false).as_bytes(),
        )
        .unwrap(),
    };
    let alg = |oid| AlgorithmIdentifierOwned {
        oid,
        parameters: None,
    };

    let pe = PkiEnvironment::new();
    let sha256 = alg(PKIXALG_ECDSA_WITH_SHA256);
    assert!(verify_signature_message_rust_crypto(&pe, message, sig.as_bytes(), &sha256, &spki).is_ok());
    let r = verify_signature_message_rust_crypto(&pe, b"tampered", sig.as_bytes(), &sha256, &spki);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::SignatureVerificationFailure)
    );

    // a P-256 key may be paired with a longer digest
    let sha384 = alg(PKIXALG_ECDSA_WITH_SHA384);
    let r = verify_signature_message_rust_crypto(&pe, message, sig.as_bytes(), &sha384, &spki);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::SignatureVerificationFailure)
    );
    let sig384: Signature256 = signing_key
        .sign_prehash(&Sha384::digest(message))
        .unwrap();
    let sig384 = sig384.to_der();
    assert!(
        verify_signature_message_rust_crypto(&pe, message, sig384.as_bytes(), &sha384, &spki)
            .is_ok()
    );

    let r = verify_signature_message_rust_crypto(
        &pe,
        message,
        sig.as_bytes(),
        &alg(PKIXALG_SHA256_WITH_RSA_ENCRYPTION),
        &spki,
    );
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::ProhibitedAlg)
    );
}

#[test]
fn test_rsassa_pss_parameters() {
    use der::asn1::{BitString, UintRef};

    let pss = |params: &[u8]| AlgorithmIdentifierOwned {
        oid: PKIXALG_RSASSA_PSS,
        parameters: Some(der::Any::from_der(params).unwrap()),
    };
    let sha256 = pss(&pss_params_encoding(HashAlgorithm::Sha256));
    let sha512 = pss(&pss_params_encoding(HashAlgorithm::Sha512));
    assert_eq!(get_pss_hash_algorithm(&sha256), Some(HashAlgorithm::Sha256));
    assert_eq!(get_pss_hash_algorithm(&sha512), Some(HashAlgorithm::Sha512));

    // SHA-256 with a 20 octet salt is not one of the accepted profiles
    let mut short_salt = pss_params_encoding(HashAlgorithm::Sha256);
    short_salt[53] = 20;
    let short_salt = pss(&short_salt);
    assert_eq!(get_pss_hash_algorithm(&short_salt), None);
    let absent = AlgorithmIdentifierOwned {
        oid: PKIXALG_RSASSA_PSS,
        parameters: None,
    };
    assert_eq!(get_pss_hash_algorithm(&absent), None);

    let modulus = [0xc5u8; 256];
    let key = rsa::pkcs1::RsaPublicKey {
        modulus: UintRef::new(&modulus).unwrap(),
        public_exponent: UintRef::new(&[0x01, 0x00, 0x01]).unwrap(),
    };
    let spki = SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_RSA_ENCRYPTION,
            parameters: Some(der::Any::null()),
        },
        subject_public_key: BitString::from_bytes(&key.to_der().unwrap()).unwrap(),
    };

    let pe = PkiEnvironment::new();
    let signature = [0x01u8; 256];
    let r = verify_signature_message_rust_crypto(&pe, b"message", &signature, &sha256, &spki);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::SignatureVerificationFailure)
    );
    let r = verify_signature_message_rust_crypto(&pe, b"message", &signature, &short_salt, &spki);
    assert_eq!(
        r.err().and_then(|e| e.status()),
        Some(PathValidationStatus::ProhibitedAlg)
    );
}
