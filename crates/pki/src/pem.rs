//! PEM handling for the credential material.

use std::fmt;

use serde::{Deserialize, Serialize};

/// X.509 certificate, DER encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateDer(pub Vec<u8>);

impl CertificateDer {
    /// Decodes a DER-encoded certificate from a PEM-encoded certificate.
    ///
    /// The input must contain exactly one certificate block.
    pub fn from_pem(pem: &str) -> Result<Self, PemError> {
        let mut certs = rustls_pemfile::certs(&mut pem.as_bytes())?;

        if certs.len() != 1 {
            return Err(PemError::UnexpectedBlockCount {
                label: PemLabel::Certificate,
                count: certs.len(),
            });
        }

        Ok(Self(certs.remove(0)))
    }
}

/// Private key, DER encoded.
#[derive(Debug, Clone, zeroize::ZeroizeOnDrop, Serialize, Deserialize)]
pub struct PrivateKeyDer(pub Vec<u8>);

impl PrivateKeyDer {
    /// Decodes a DER-encoded private key from a PEM-encoded PKCS#8 key.
    ///
    /// The input must contain exactly one private key block.
    pub fn from_pem(pem: &str) -> Result<Self, PemError> {
        let mut keys = rustls_pemfile::pkcs8_private_keys(&mut pem.as_bytes())?;

        if keys.len() != 1 {
            return Err(PemError::UnexpectedBlockCount {
                label: PemLabel::Pkcs8PrivateKey,
                count: keys.len(),
            });
        }

        Ok(Self(keys.remove(0)))
    }
}

/// Label of a PEM block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemLabel {
    /// An X.509 certificate, `CERTIFICATE`.
    Certificate,
    /// A PKCS#8 private key, `PRIVATE KEY`.
    Pkcs8PrivateKey,
}

impl PemLabel {
    /// Returns the label as written between the block markers.
    pub fn as_str(&self) -> &'static str {
        match self {
            PemLabel::Certificate => "CERTIFICATE",
            PemLabel::Pkcs8PrivateKey => "PRIVATE KEY",
        }
    }
}

impl fmt::Display for PemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checks the structural framing of a single PEM blob.
///
/// The first line must be the `BEGIN` marker for `label`, the last line
/// the matching `END` marker, and the blob must close with a line
/// terminator.
pub fn verify_framing(pem: &str, label: PemLabel) -> Result<(), PemError> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let mut lines = pem.lines();
    if lines.next() != Some(begin.as_str()) {
        return Err(PemError::MissingMarker { marker: begin });
    }

    // `str::lines` swallows the final terminator, so check it directly.
    if !pem.ends_with('\n') {
        return Err(PemError::MissingTrailingTerminator);
    }

    if lines.last() != Some(end.as_str()) {
        return Err(PemError::MissingMarker { marker: end });
    }

    Ok(())
}

/// PEM handling error.
#[derive(Debug, thiserror::Error)]
pub enum PemError {
    /// Reading or base64-decoding the input failed.
    #[error("failed to decode PEM input: {0}")]
    Decode(#[from] std::io::Error),
    /// The input did not contain exactly one block of the expected
    /// label.
    #[error("expected exactly one {label} block, found {count}")]
    UnexpectedBlockCount {
        /// Expected block label.
        label: PemLabel,
        /// Number of blocks found.
        count: usize,
    },
    /// A framing marker line is missing or malformed.
    #[error("missing PEM marker line {marker:?}")]
    MissingMarker {
        /// The expected marker line.
        marker: String,
    },
    /// The blob does not close with a line terminator.
    #[error("PEM blob does not end with a line terminator")]
    MissingTrailingTerminator,
}
