//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use alloc::vec::Vec;
use core::fmt;

use der::asn1::BitString;
use der::{asn1::ObjectIdentifier, Decode, Encode};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::ext::{pkix::*, Extension};
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::pdv_extension::*;
use crate::util::error::*;
use crate::util::pdv_utilities::{is_self_issued, name_to_string};

/// [`PDVCertificate`] is used to aggregate a binary, DER-encoded Certificate, a parsed Certificate,
/// the to-be-signed span of the encoding and parsed extensions in support of certification path
/// development and validation operations.
///
/// The parsed extensions are those listed in [`EXTS_OF_INTEREST`]. A certificate carrying one of those
/// extensions in a form that does not decode cannot be wrapped.
#[derive(Clone, Eq, PartialEq)]
pub struct PDVCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Parsed extensions from the Certificate
    pub parsed_extensions: ParsedExtensions,
    /// The TBSCertificate exactly as it appears in `encoded_cert`
    tbs_field: Vec<u8>,
}

impl fmt::Debug for PDVCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PDVCertificate")
            .field("subject", &name_to_string(self.subject()))
            .field("issuer", &name_to_string(self.issuer()))
            .field(
                "serial_number",
                &self.decoded_cert.tbs_certificate.serial_number,
            )
            .finish()
    }
}

impl TryFrom<&[u8]> for PDVCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        PDVCertificate::new(enc_cert.to_vec(), cert)
    }
}

impl TryFrom<Certificate> for PDVCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        PDVCertificate::new(enc_cert, cert)
    }
}

impl PDVCertificate {
    fn new(encoded_cert: Vec<u8>, decoded_cert: Certificate) -> der::Result<Self> {
        let defer_cert = DeferDecodeSigned::from_der(&encoded_cert)?;
        let mut pdv_cert = PDVCertificate {
            encoded_cert,
            decoded_cert,
            parsed_extensions: Default::default(),
            tbs_field: defer_cert.tbs_field,
        };
        pdv_cert.parse_extensions(EXTS_OF_INTEREST)?;
        Ok(pdv_cert)
    }

    /// Subject name of the certificate
    pub fn subject(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.subject
    }

    /// Issuer name of the certificate
    pub fn issuer(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.issuer
    }

    /// Subject public key of the certificate
    pub fn public_key(&self) -> &SubjectPublicKeyInfoOwned {
        &self.decoded_cert.tbs_certificate.subject_public_key_info
    }

    /// Outer signature algorithm of the certificate
    pub fn signature_algorithm(&self) -> &AlgorithmIdentifierOwned {
        &self.decoded_cert.signature_algorithm
    }

    /// Signature value of the certificate
    pub fn signature(&self) -> &BitString {
        &self.decoded_cert.signature
    }

    /// The bytes covered by the signature, taken from the original encoding
    pub fn tbs_bytes(&self) -> &[u8] {
        &self.tbs_field
    }

    /// Returns true if subject and issuer names match
    pub fn is_self_issued(&self) -> bool {
        is_self_issued(&self.decoded_cert)
    }

    /// `find_extension` returns the raw extension with the given OID, if present. A certificate that
    /// features more than one instance of the extension is rejected.
    pub fn find_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&Extension>> {
        let exts = match &self.decoded_cert.tbs_certificate.extensions {
            Some(exts) => exts,
            None => return Ok(None),
        };
        let mut found = None;
        for ext in exts.iter().filter(|ext| ext.extn_id == *oid) {
            if found.is_some() {
                return Err(Error::VerificationFailure(VerificationFailure::for_extension(
                    PathValidationStatus::InvalidCertificate,
                    *oid,
                    alloc::format!(
                        "{} features duplicate instances of an extension",
                        name_to_string(self.subject())
                    ),
                )));
            }
            found = Some(ext);
        }
        Ok(found)
    }

    /// Returns the parsed basicConstraints extension, if present
    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        match self.get_extension(&const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS) {
            Some(PDVExtension::BasicConstraints(bc)) => Some(bc),
            _ => None,
        }
    }

    /// Returns the parsed keyUsage extension, if present
    pub fn key_usage(&self) -> Option<&KeyUsage> {
        match self.get_extension(&const_oid::db::rfc5912::ID_CE_KEY_USAGE) {
            Some(PDVExtension::KeyUsage(ku)) => Some(ku),
            _ => None,
        }
    }

    /// Returns the parsed extKeyUsage extension, if present
    pub fn extended_key_usage(&self) -> Option<&ExtendedKeyUsage> {
        match self.get_extension(&const_oid::db::rfc5912::ID_CE_EXT_KEY_USAGE) {
            Some(PDVExtension::ExtendedKeyUsage(eku)) => Some(eku),
            _ => None,
        }
    }

    /// Returns the parsed subjectAltName extension, if present
    pub fn subject_alt_name(&self) -> Option<&SubjectAltName> {
        match self.get_extension(&const_oid::db::rfc5912::ID_CE_SUBJECT_ALT_NAME) {
            Some(PDVExtension::SubjectAltName(san)) => Some(san),
            _ => None,
        }
    }

    /// Returns the parsed nameConstraints extension, if present
    pub fn name_constraints(&self) -> Option<&NameConstraints> {
        match self.get_extension(&const_oid::db::rfc5912::ID_CE_NAME_CONSTRAINTS) {
            Some(PDVExtension::NameConstraints(nc)) => Some(nc),
            _ => None,
        }
    }
}

impl ExtensionProcessing for PDVCertificate {
    /// `get_extension` takes an ObjectIdentifier that identifies and extension type and returns
    /// a previously parsed [`PDVExtension`] instance containing the decoded extension if the extension was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Option<&'_ PDVExtension> {
        self.parsed_extensions.get(oid)
    }

    fn parse_extensions(&'_ mut self, oids: &[ObjectIdentifier]) -> der::Result<()> {
        macro_rules! add {
            ($pe:ident, $ext:ident, $t:ident) => {
                $pe.insert(
                    $ext.extn_id,
                    PDVExtension::$t($t::from_der($ext.extn_value.as_bytes())?),
                )
            };
        }

        let exts = match self.decoded_cert.tbs_certificate.extensions.as_ref() {
            Some(exts) => exts,
            None => return Ok(()),
        };
        let pe = &mut self.parsed_extensions;
        for ext in exts.iter().filter(|ext| oids.contains(&ext.extn_id)) {
            match ext.extn_id {
                const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS => add!(pe, ext, BasicConstraints),
                const_oid::db::rfc5912::ID_CE_SUBJECT_KEY_IDENTIFIER => {
                    add!(pe, ext, SubjectKeyIdentifier)
                }
                const_oid::db::rfc5912::ID_CE_EXT_KEY_USAGE => add!(pe, ext, ExtendedKeyUsage),
                const_oid::db::rfc5912::ID_PE_AUTHORITY_INFO_ACCESS => {
                    add!(pe, ext, AuthorityInfoAccessSyntax)
                }
                const_oid::db::rfc5912::ID_CE_KEY_USAGE => add!(pe, ext, KeyUsage),
                const_oid::db::rfc5912::ID_CE_SUBJECT_ALT_NAME => add!(pe, ext, SubjectAltName),
                const_oid::db::rfc5912::ID_CE_NAME_CONSTRAINTS => add!(pe, ext, NameConstraints),
                const_oid::db::rfc5912::ID_CE_AUTHORITY_KEY_IDENTIFIER => {
                    add!(pe, ext, AuthorityKeyIdentifier)
                }
                const_oid::db::rfc5912::ID_CE_POLICY_CONSTRAINTS => {
                    add!(pe, ext, PolicyConstraints)
                }
                _ => None,
            };
        }
        Ok(())
    }
}

/// [`DeferDecodeSigned`] used to parse only the top-level Certificate structure, without parsing the details of the
/// TBSCertificate, AlgorithmIdentifier or BIT STRING fields.
///
/// Deferred decoding is useful when verifying certificates to avoid re-encoding the TBSCertificate
/// (and potentially encountering problems with structures that were not DER-encoded prior to signing).
/// This is intended to be used in tandem with a [`PDVCertificate`] structure that contains a fully-decoded
/// Certificate structure.
pub struct DeferDecodeSigned {
    /// tbsCertificate       TBSCertificate,
    pub tbs_field: Vec<u8>,
    /// signatureAlgorithm   AlgorithmIdentifier,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// signature            BIT STRING
    pub signature: BitString,
}

impl ::der::FixedTag for DeferDecodeSigned {
    const TAG: ::der::Tag = ::der::Tag::Sequence;
}

impl<'a> ::der::DecodeValue<'a> for DeferDecodeSigned {
    fn decode_value<R: ::der::Reader<'a>>(
        reader: &mut R,
        header: ::der::Header,
    ) -> ::der::Result<Self> {
        use ::der::Reader as _;
        reader.read_nested(header.length, |reader| {
            let tbs_certificate = reader.tlv_bytes()?;
            let signature_algorithm = reader.decode()?;
            let signature = reader.decode()?;
            Ok(Self {
                tbs_field: tbs_certificate.to_vec(),
                signature_algorithm,
                signature,
            })
        })
    }
}
