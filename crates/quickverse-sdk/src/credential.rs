//! Service credential and the bearer token derived from it.

use crate::error::{Error, UnconfiguredReason};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quickverse_common_secret::SecretString;

/// API key and package name identifying the application to the service.
///
/// Immutable once built. Validation is deferred to [`Credential::auth_token`]
/// so that an empty field surfaces as `Unconfigured` on the first request.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    api_key: SecretString,
    package_name: String,
}

impl Credential {
    /// Create a credential.
    pub fn new(api_key: impl Into<SecretString>, package_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            package_name: package_name.into(),
        }
    }

    /// The application package name.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Check both fields are present.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_blank() {
            return Err(Error::unconfigured(UnconfiguredReason::MissingApiKey));
        }
        if self.package_name.trim().is_empty() {
            return Err(Error::unconfigured(UnconfiguredReason::MissingPackageName));
        }
        Ok(())
    }

    /// Derive the bearer token: base64 of `"{package_name}:{api_key}"`.
    pub fn auth_token(&self) -> Result<AuthToken, Error> {
        self.validate()?;
        let raw = format!("{}:{}", self.package_name, self.api_key.expose());
        Ok(AuthToken(SecretString::new(STANDARD.encode(raw))))
    }
}

/// Encoded credential sent as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// The encoded token, without the `Bearer` prefix.
    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}
