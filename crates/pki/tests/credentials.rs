//! End-to-end checks of the embedded credential fixture.

use mdc_fixture_certs::{CERT, KEY, MBED_DOMAIN, MBED_ENDPOINT_NAME, SERVER_CERT};
use mdc_fixture_pki::{
    pem::{self, PemLabel},
    CredentialError, DeviceCredentials, DeviceIdentity, FIXTURE_VALID_AT,
};
use rstest::*;

/// 1980-01-01T00:00:00Z, before either certificate was issued.
const BEFORE_ISSUANCE: i64 = 315_532_800;

/// 2017-06-01T00:00:00Z, after the device certificate expired but while
/// the trust anchor was still valid.
const AFTER_DEVICE_EXPIRY: i64 = 1_496_275_200;

/// 2026-01-01T00:00:00Z, after everything expired.
const AFTER_ALL_EXPIRY: i64 = 1_767_225_600;

#[fixture]
#[once]
fn credentials() -> DeviceCredentials {
    DeviceCredentials::embedded().unwrap()
}

#[rstest]
#[case::server_cert(SERVER_CERT, PemLabel::Certificate)]
#[case::client_cert(CERT, PemLabel::Certificate)]
#[case::client_key(KEY, PemLabel::Pkcs8PrivateKey)]
fn blobs_are_pem_framed(#[case] blob: &str, #[case] label: PemLabel) {
    assert!(pem::verify_framing(blob, label).is_ok());
}

#[rstest]
fn identity_matches_the_identifier_constants(credentials: &DeviceCredentials) {
    assert_eq!(credentials.identity().domain().as_str(), MBED_DOMAIN);
    assert_eq!(
        credentials.identity().endpoint().as_str(),
        MBED_ENDPOINT_NAME
    );
}

#[rstest]
fn anchor_summary_matches_the_known_material(credentials: &DeviceCredentials) {
    let summary = credentials.server_summary().unwrap();

    assert_eq!(summary.common_name.as_deref(), Some("ARM mbed"));
    assert!(summary.subject.contains("ARM mbed"));
    assert!(summary.is_self_issued());
    assert_eq!(summary.serial, "554080d2");
    // 2015-04-29T06:57:48Z..2018-04-29T06:57:48Z.
    assert_eq!(summary.validity.not_before, 1_430_290_668);
    assert_eq!(summary.validity.not_after, 1_524_985_068);
}

#[rstest]
fn device_summary_matches_the_known_material(credentials: &DeviceCredentials) {
    let summary = credentials.client_summary().unwrap();

    assert!(summary.issuer.contains("mbed-connector-2016"));
    assert!(!summary.is_self_issued());
    assert_eq!(summary.serial, "288a3372");
    // 2016-02-20T02:27:16Z..2016-12-31T06:00:00Z.
    assert_eq!(summary.validity.not_before, 1_455_935_236);
    assert_eq!(summary.validity.not_after, 1_483_164_000);
}

/// The device certificate's subject common name carries the registered
/// identity.
#[rstest]
fn device_common_name_parses_back_to_the_identity(credentials: &DeviceCredentials) {
    let summary = credentials.client_summary().unwrap();
    let cn = summary.common_name.unwrap();

    assert_eq!(
        DeviceIdentity::from_common_name(&cn).unwrap(),
        *credentials.identity()
    );
}

#[rstest]
fn fixture_time_is_inside_both_windows(credentials: &DeviceCredentials) {
    let server = credentials.server_summary().unwrap();
    let client = credentials.client_summary().unwrap();

    assert!(server.validity.contains(FIXTURE_VALID_AT));
    assert!(client.validity.contains(FIXTURE_VALID_AT));
}

#[rstest]
fn credentials_verify_at_the_pinned_time(credentials: &DeviceCredentials) {
    assert!(credentials.verify_at(FIXTURE_VALID_AT).is_ok());
}

/// Expect to fail because neither certificate had been issued yet.
#[rstest]
fn verification_fails_before_issuance(credentials: &DeviceCredentials) {
    let err = credentials.verify_at(BEFORE_ISSUANCE).unwrap_err();

    assert!(matches!(err, CredentialError::OutsideValidity { .. }));
}

/// Expect to fail on the device certificate: its window closed end of
/// 2016 while the anchor ran until 2018.
#[rstest]
fn verification_fails_after_device_expiry(credentials: &DeviceCredentials) {
    let err = credentials.verify_at(AFTER_DEVICE_EXPIRY).unwrap_err();

    match err {
        CredentialError::OutsideValidity { subject, .. } => {
            assert!(subject.contains("mbed user"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Expect to fail because the material is long expired; this is the
/// present-day behavior the fixture intentionally preserves.
#[rstest]
fn verification_fails_at_the_present_day(credentials: &DeviceCredentials) {
    let err = credentials.verify_at(AFTER_ALL_EXPIRY).unwrap_err();

    assert!(matches!(err, CredentialError::OutsideValidity { .. }));
}
