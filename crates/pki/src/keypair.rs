//! Certificate/key pairing checks.

use p256::{
    ecdsa::{
        signature::{Signer, Verifier},
        Signature, SigningKey, VerifyingKey,
    },
    pkcs8::DecodePrivateKey,
};

use crate::{
    pem::{CertificateDer, PrivateKeyDer},
    x509::{CertificateSummary, X509Error},
};

/// Message signed when probing that a certificate and key pair up.
const PAIRING_PROBE: &[u8] = b"device credential pairing probe";

/// Checks that `cert`'s public key pairs with `key`.
///
/// Signs a probe message with the private key and verifies it with the
/// certificate's public key. A mismatched pair would otherwise surface
/// downstream only as an opaque mutual-TLS handshake failure.
pub fn verify_keypair(cert: &CertificateDer, key: &PrivateKeyDer) -> Result<(), KeypairError> {
    let summary = CertificateSummary::parse(cert)?;
    let verifying = VerifyingKey::from_sec1_bytes(&summary.public_key.key)
        .map_err(|_| KeypairError::InvalidPublicKey)?;

    let signing =
        SigningKey::from_pkcs8_der(&key.0).map_err(|_| KeypairError::InvalidPrivateKey)?;

    let signature: Signature = signing.sign(PAIRING_PROBE);
    verifying
        .verify(PAIRING_PROBE, &signature)
        .map_err(|_| KeypairError::Mismatch)?;

    Ok(())
}

/// Error for [`verify_keypair`].
#[derive(Debug, thiserror::Error)]
pub enum KeypairError {
    /// The certificate could not be parsed.
    #[error(transparent)]
    Certificate(#[from] X509Error),
    /// The certificate's public key is not a valid P-256 point.
    #[error("certificate public key is not a valid P-256 point")]
    InvalidPublicKey,
    /// The private key is not a valid PKCS#8 P-256 key.
    #[error("private key is not a valid PKCS#8 P-256 key")]
    InvalidPrivateKey,
    /// The public and private halves do not pair.
    #[error("certificate public key does not pair with the private key")]
    Mismatch,
}

#[cfg(test)]
mod tests {
    use mdc_fixture_certs::{CERT, KEY, SERVER_CERT};
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn client_key() -> PrivateKeyDer {
        PrivateKeyDer::from_pem(KEY).unwrap()
    }

    #[rstest]
    fn device_certificate_pairs_with_key(client_key: PrivateKeyDer) {
        let cert = CertificateDer::from_pem(CERT).unwrap();

        assert!(verify_keypair(&cert, &client_key).is_ok());
    }

    /// Expect to fail because the trust anchor holds the service CA's
    /// key, not the device key.
    #[rstest]
    fn anchor_does_not_pair_with_device_key(client_key: PrivateKeyDer) {
        let cert = CertificateDer::from_pem(SERVER_CERT).unwrap();

        let err = verify_keypair(&cert, &client_key).unwrap_err();

        assert!(matches!(err, KeypairError::Mismatch));
    }

    #[rstest]
    fn truncated_key_is_rejected(client_key: PrivateKeyDer) {
        let cert = CertificateDer::from_pem(CERT).unwrap();
        let truncated = PrivateKeyDer(client_key.0[..client_key.0.len() / 2].to_vec());

        let err = verify_keypair(&cert, &truncated).unwrap_err();

        assert!(matches!(err, KeypairError::InvalidPrivateKey));
    }
}
