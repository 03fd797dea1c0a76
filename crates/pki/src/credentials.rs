//! Typed bundle over the embedded credential fixture.

use mdc_fixture_certs::{CERT, KEY, MBED_DOMAIN, MBED_ENDPOINT_NAME, SERVER_CERT};
use tracing::{debug, instrument};

use crate::{
    identity::{DeviceIdentity, IdentityError},
    keypair::{self, KeypairError},
    pem::{self, CertificateDer, PemError, PemLabel, PrivateKeyDer},
    x509::{self, CertificateSummary, X509Error},
};

/// Unix time at which every embedded certificate is inside its validity
/// window: 2016-06-01T00:00:00Z.
///
/// The material expired years ago, so verification has to pin a
/// historical clock instead of reading the present time.
pub const FIXTURE_VALID_AT: i64 = 1_464_739_200;

/// The embedded device credentials, decoded.
#[derive(Debug, Clone)]
pub struct DeviceCredentials {
    identity: DeviceIdentity,
    server_cert: CertificateDer,
    client_cert: CertificateDer,
    client_key: PrivateKeyDer,
}

impl DeviceCredentials {
    /// Decodes the embedded fixture material.
    pub fn embedded() -> Result<Self, CredentialError> {
        pem::verify_framing(SERVER_CERT, PemLabel::Certificate)?;
        pem::verify_framing(CERT, PemLabel::Certificate)?;
        pem::verify_framing(KEY, PemLabel::Pkcs8PrivateKey)?;

        let identity =
            DeviceIdentity::new(MBED_DOMAIN.try_into()?, MBED_ENDPOINT_NAME.try_into()?);

        Ok(Self {
            identity,
            server_cert: CertificateDer::from_pem(SERVER_CERT)?,
            client_cert: CertificateDer::from_pem(CERT)?,
            client_key: PrivateKeyDer::from_pem(KEY)?,
        })
    }

    /// Returns the identity the device registers with.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the trust anchor for the service's TLS certificate.
    pub fn server_cert(&self) -> &CertificateDer {
        &self.server_cert
    }

    /// Returns the device certificate.
    pub fn client_cert(&self) -> &CertificateDer {
        &self.client_cert
    }

    /// Returns the device private key.
    pub fn client_key(&self) -> &PrivateKeyDer {
        &self.client_key
    }

    /// Parses the trust anchor's summary.
    pub fn server_summary(&self) -> Result<CertificateSummary, X509Error> {
        CertificateSummary::parse(&self.server_cert)
    }

    /// Parses the device certificate's summary.
    pub fn client_summary(&self) -> Result<CertificateSummary, X509Error> {
        CertificateSummary::parse(&self.client_cert)
    }

    /// Runs the full consistency check against the given unix time.
    ///
    /// Checks that the trust anchor is self-signed, that the device
    /// certificate names the registered identity, that both
    /// certificates are inside their validity windows at `time`, and
    /// that the device certificate's public key pairs with the private
    /// key.
    #[instrument(level = "debug", skip(self))]
    pub fn verify_at(&self, time: i64) -> Result<(), CredentialError> {
        let server = self.server_summary()?;
        let client = self.client_summary()?;

        if !server.is_self_issued() {
            return Err(CredentialError::AnchorNotSelfIssued {
                issuer: server.issuer,
            });
        }
        x509::verify_self_signature(&self.server_cert)?;

        let expected = self.identity.common_name();
        if client.common_name.as_deref() != Some(expected.as_str()) {
            return Err(CredentialError::CommonNameMismatch {
                expected,
                found: client.common_name,
            });
        }

        for summary in [&server, &client] {
            if !summary.validity.contains(time) {
                return Err(CredentialError::OutsideValidity {
                    subject: summary.subject.clone(),
                    time,
                    not_before: summary.validity.not_before,
                    not_after: summary.validity.not_after,
                });
            }
        }

        keypair::verify_keypair(&self.client_cert, &self.client_key)?;

        debug!(time, identity = %self.identity, "credential fixture verified");

        Ok(())
    }
}

/// Error for [`DeviceCredentials`].
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// PEM decoding or framing failed.
    #[error(transparent)]
    Pem(#[from] PemError),
    /// An identifier is invalid.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Certificate parsing or signature verification failed.
    #[error(transparent)]
    X509(#[from] X509Error),
    /// The certificate and key do not pair.
    #[error(transparent)]
    Keypair(#[from] KeypairError),
    /// The trust anchor is not self-issued.
    #[error("trust anchor is not self-issued, issuer: {issuer}")]
    AnchorNotSelfIssued {
        /// Issuer distinguished name found.
        issuer: String,
    },
    /// The device certificate does not name the registered identity.
    #[error("device certificate common name {found:?} does not match {expected:?}")]
    CommonNameMismatch {
        /// Common name composed from the identity.
        expected: String,
        /// Common name found in the certificate.
        found: Option<String>,
    },
    /// A certificate is outside its validity window.
    #[error(
        "certificate {subject:?} is outside its validity window at {time} \
         (valid {not_before}..={not_after})"
    )]
    OutsideValidity {
        /// Subject of the certificate that failed.
        subject: String,
        /// Unix time of the check.
        time: i64,
        /// Window start, unix seconds.
        not_before: i64,
        /// Window end, unix seconds.
        not_after: i64,
    },
}
