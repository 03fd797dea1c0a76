//! Typed access and structural checks for the device-connector
//! credential fixtures.
//!
//! [`mdc_fixture_certs`] carries the raw material: the service's trust
//! anchor, a device certificate, the device's private key and the
//! domain/endpoint identifiers the device registers with. This crate
//! decodes that material into typed values and implements the checks a
//! test suite needs before trusting it: PEM framing, DER
//! well-formedness, identifier format, certificate/key pairing and the
//! (long expired) validity windows.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

pub mod credentials;
pub mod identity;
pub mod keypair;
pub mod pem;
pub mod x509;

pub use credentials::{CredentialError, DeviceCredentials, FIXTURE_VALID_AT};
pub use identity::{DeviceIdentity, Domain, EndpointName, IdentityError};
pub use keypair::{verify_keypair, KeypairError};
pub use pem::{CertificateDer, PemError, PemLabel, PrivateKeyDer};
pub use x509::{CertificateSummary, SubjectPublicKey, Validity, X509Error};
