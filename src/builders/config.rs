//! Configuration Builder
//!
//! Fluent builder for identity client configuration.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::core::{DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT};
use crate::error::{ConfigurationError, IdentityError};
use crate::types::{ClientCredentials, IdentityConfig};

/// Identity client configuration builder.
#[derive(Default)]
pub struct IdentityConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    domain: Option<String>,
    timeout: Option<Duration>,
    max_response_size: Option<usize>,
}

impl IdentityConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret, making this a confidential client.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set the hosted domain (bare host, e.g. `auth.example.com`).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the response size cap of the default transport.
    pub fn max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = Some(max_response_size);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<IdentityConfig, IdentityError> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigurationError::MissingRequired {
                field: "client_id".to_string(),
            })?;

        let domain = self
            .domain
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ConfigurationError::MissingRequired {
                field: "domain".to_string(),
            })?;
        validate_domain(&domain)?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(IdentityConfig {
            credentials: ClientCredentials {
                client_id,
                client_secret: self.client_secret,
                domain,
            },
            timeout,
            max_response_size: self.max_response_size.unwrap_or(DEFAULT_MAX_RESPONSE_SIZE),
        })
    }
}

/// Create a new identity configuration builder.
pub fn identity_config() -> IdentityConfigBuilder {
    IdentityConfigBuilder::new()
}

fn validate_domain(domain: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidDomain {
        domain: domain.to_string(),
        reason: reason.to_string(),
    };

    if domain.contains("://") {
        return Err(invalid("expected a bare host without a scheme"));
    }
    if domain.ends_with('/') {
        return Err(invalid("expected a bare host without a trailing slash"));
    }

    let url = Url::parse(&format!("https://{}", domain)).map_err(|e| invalid(&e.to_string()))?;

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("expected a bare host without a path"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("expected a bare host without credentials"));
    }

    Ok(())
}
