//! X.509 inspection for the credential material.

use serde::{Deserialize, Serialize};
use x509_parser::{certificate::X509Certificate, prelude::FromDer};

use crate::pem::CertificateDer;

/// Parsed view of the stable fields of an X.509 certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateSummary {
    /// Subject distinguished name.
    pub subject: String,
    /// Subject common name, when present.
    pub common_name: Option<String>,
    /// Issuer distinguished name.
    pub issuer: String,
    /// Serial number, lowercase hex.
    pub serial: String,
    /// Validity window.
    pub validity: Validity,
    /// Signature algorithm OID in dotted form.
    pub signature_algorithm: String,
    /// Subject public key.
    pub public_key: SubjectPublicKey,
}

impl CertificateSummary {
    /// Parses the summary from a DER-encoded certificate.
    pub fn parse(cert: &CertificateDer) -> Result<Self, X509Error> {
        let parsed = parse_der(&cert.0)?;

        let common_name = parsed
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(|cn| cn.to_string());

        let spki = parsed.public_key();
        let public_key = SubjectPublicKey {
            algorithm: spki.algorithm.algorithm.to_id_string(),
            parameters: spki
                .algorithm
                .parameters
                .as_ref()
                .and_then(|params| params.as_oid().ok())
                .map(|oid| oid.to_id_string()),
            key: spki.subject_public_key.data.as_ref().to_vec(),
        };

        Ok(Self {
            subject: parsed.subject().to_string(),
            common_name,
            issuer: parsed.issuer().to_string(),
            serial: hex::encode(parsed.tbs_certificate.raw_serial()),
            validity: Validity {
                not_before: parsed.validity().not_before.timestamp(),
                not_after: parsed.validity().not_after.timestamp(),
            },
            signature_algorithm: parsed.signature_algorithm.algorithm.to_id_string(),
            public_key,
        })
    }

    /// Whether the certificate is self-issued, i.e. subject equals
    /// issuer.
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

/// Certificate validity window, unix seconds, inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    /// Start of the window.
    pub not_before: i64,
    /// End of the window.
    pub not_after: i64,
}

impl Validity {
    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: i64) -> bool {
        self.not_before <= time && time <= self.not_after
    }
}

/// Subject public key of a certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPublicKey {
    /// Key algorithm OID in dotted form.
    pub algorithm: String,
    /// Named-curve or other parameter OID, when present.
    pub parameters: Option<String>,
    /// Raw key bytes. For EC keys this is the SEC1-encoded point.
    pub key: Vec<u8>,
}

/// Parses exactly one DER-encoded certificate, rejecting trailing
/// bytes.
fn parse_der(der: &[u8]) -> Result<X509Certificate<'_>, X509Error> {
    let (rest, cert) = X509Certificate::from_der(der).map_err(|e| X509Error::Parse {
        reason: e.to_string(),
    })?;

    if !rest.is_empty() {
        return Err(X509Error::TrailingData { count: rest.len() });
    }

    Ok(cert)
}

/// Verifies `cert`'s signature against `issuer`'s public key.
///
/// Signature algorithms outside the supported table are rejected rather
/// than ignored.
pub fn verify_signature(cert: &CertificateDer, issuer: &CertificateDer) -> Result<(), X509Error> {
    let cert = parse_der(&cert.0)?;
    let issuer = parse_der(&issuer.0)?;

    let oid = cert.signature_algorithm.algorithm.to_id_string();
    let alg: &'static dyn ring::signature::VerificationAlgorithm = match oid.as_str() {
        "1.2.840.10045.4.3.2" => &ring::signature::ECDSA_P256_SHA256_ASN1,
        "1.2.840.10045.4.3.3" => &ring::signature::ECDSA_P384_SHA384_ASN1,
        "1.2.840.113549.1.1.11" => &ring::signature::RSA_PKCS1_2048_8192_SHA256,
        "1.2.840.113549.1.1.12" => &ring::signature::RSA_PKCS1_2048_8192_SHA384,
        "1.2.840.113549.1.1.13" => &ring::signature::RSA_PKCS1_2048_8192_SHA512,
        _ => return Err(X509Error::UnsupportedSignatureAlgorithm { oid }),
    };

    // ring takes the BIT STRING contents of the SPKI, not the whole
    // SubjectPublicKeyInfo structure.
    let issuer_key = issuer.public_key().subject_public_key.data.as_ref();

    ring::signature::UnparsedPublicKey::new(alg, issuer_key)
        .verify(
            cert.tbs_certificate.as_ref(),
            cert.signature_value.as_ref(),
        )
        .map_err(|_| X509Error::BadSignature)?;

    Ok(())
}

/// Verifies a self-signed certificate's signature against its own key.
pub fn verify_self_signature(cert: &CertificateDer) -> Result<(), X509Error> {
    verify_signature(cert, cert)
}

/// X.509 inspection error.
#[derive(Debug, thiserror::Error)]
pub enum X509Error {
    /// DER parsing failed.
    #[error("failed to parse certificate DER: {reason}")]
    Parse {
        /// Parser failure description.
        reason: String,
    },
    /// Input continues past the end of the certificate.
    #[error("{count} trailing bytes after certificate DER")]
    TrailingData {
        /// Number of unconsumed bytes.
        count: usize,
    },
    /// The signature algorithm is not in the supported table.
    #[error("unsupported signature algorithm: {oid}")]
    UnsupportedSignatureAlgorithm {
        /// Dotted algorithm OID.
        oid: String,
    },
    /// The signature does not verify under the issuer's key.
    #[error("certificate signature verification failed")]
    BadSignature,
}
