//! Identity a device registers with its device-management service.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant domain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Domain(String);

impl Domain {
    /// Returns the domain as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Domain {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        check_canonical_uuid(value)?;

        Ok(Domain(value.to_string()))
    }
}

impl TryFrom<String> for Domain {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Endpoint name identifying the device within its domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct EndpointName(String);

impl EndpointName {
    /// Returns the endpoint name as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EndpointName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EndpointName {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        check_canonical_uuid(value)?;

        Ok(EndpointName(value.to_string()))
    }
}

impl TryFrom<String> for EndpointName {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Registration identity: tenant domain plus endpoint name.
///
/// The device certificate binds the pair into its subject common name
/// as `<domain>/<endpoint>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    domain: Domain,
    endpoint: EndpointName,
}

impl DeviceIdentity {
    /// Creates a new identity.
    pub fn new(domain: Domain, endpoint: EndpointName) -> Self {
        Self { domain, endpoint }
    }

    /// Returns the domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns the endpoint name.
    pub fn endpoint(&self) -> &EndpointName {
        &self.endpoint
    }

    /// Returns the subject common name form, `<domain>/<endpoint>`.
    pub fn common_name(&self) -> String {
        format!("{}/{}", self.domain, self.endpoint)
    }

    /// Parses an identity from the subject common name form.
    pub fn from_common_name(cn: &str) -> Result<Self, IdentityError> {
        let (domain, endpoint) = cn
            .split_once('/')
            .ok_or_else(|| IdentityError::MalformedCommonName(cn.to_string()))?;

        Ok(Self {
            domain: domain.try_into()?,
            endpoint: endpoint.try_into()?,
        })
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.endpoint)
    }
}

/// The registration interface wants the hyphenated lowercase form only,
/// while `Uuid::parse_str` also accepts braced, simple and urn forms.
fn check_canonical_uuid(value: &str) -> Result<(), IdentityError> {
    let parsed = Uuid::parse_str(value)
        .map_err(|_| IdentityError::InvalidIdentifier(value.to_string()))?;

    if parsed.as_hyphenated().to_string() != value {
        return Err(IdentityError::InvalidIdentifier(value.to_string()));
    }

    Ok(())
}

/// Error for identity values.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The identifier is not a canonical UUID.
    #[error("identifier is not a canonical UUID: {0:?}")]
    InvalidIdentifier(String),
    /// The common name is not of the `<domain>/<endpoint>` form.
    #[error("common name is not of the form <domain>/<endpoint>: {0:?}")]
    MalformedCommonName(String),
}
