//! Configuration Types
//!
//! Client configuration and the endpoint layout of a hosted domain.

use secrecy::SecretString;
use std::fmt;
use std::time::Duration;

use crate::core::{DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT};

/// Authorization endpoint path.
pub const AUTHORIZE_PATH: &str = "/oauth2/authorize";
/// Token endpoint path.
pub const TOKEN_PATH: &str = "/oauth2/token";
/// UserInfo endpoint path.
pub const USER_INFO_PATH: &str = "/oauth2/userInfo";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/logout";

fn endpoint_url(domain: &str, path: &str) -> String {
    format!("https://{}{}", domain, path)
}

/// Identity client configuration.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    /// Client credentials and provider domain.
    pub credentials: ClientCredentials,
    /// HTTP timeout applied by the default transport.
    pub timeout: Duration,
    /// Largest response body the default transport accepts.
    pub max_response_size: usize,
}

impl IdentityConfig {
    /// Endpoints of the configured domain.
    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints::for_domain(&self.credentials.domain)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            credentials: ClientCredentials::default(),
            timeout: DEFAULT_TIMEOUT,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

/// Client credentials for the hosted domain.
#[derive(Clone, Default)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    /// Client secret (confidential clients only).
    pub client_secret: Option<SecretString>,
    /// Bare host of the authorization server, e.g. `auth.example.com`.
    pub domain: String,
}

impl ClientCredentials {
    /// Whether the client authenticates at the token endpoint.
    pub fn is_confidential(&self) -> bool {
        self.client_secret.is_some()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("domain", &self.domain)
            .finish()
    }
}

/// Absolute endpoint URLs for one domain. Every URL the client emits or
/// calls comes from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub logout_endpoint: String,
}

impl ProviderEndpoints {
    /// Derive the endpoints of `domain`.
    pub fn for_domain(domain: &str) -> Self {
        Self {
            authorization_endpoint: endpoint_url(domain, AUTHORIZE_PATH),
            token_endpoint: endpoint_url(domain, TOKEN_PATH),
            userinfo_endpoint: endpoint_url(domain, USER_INFO_PATH),
            logout_endpoint: endpoint_url(domain, LOGOUT_PATH),
        }
    }
}

/// Grant type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantType {
    /// Authorization code, with or without PKCE.
    AuthorizationCode,
    ClientCredentials,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
