//! Token Types
//!
//! Token endpoint request parameters and the record parsed from its response.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;

use super::Scope;

/// Raw token endpoint response. Every field may be missing or `null`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Tokens issued by the provider.
///
/// `expires_at` is fixed when the record is built and is present exactly when
/// the provider reported `expires_in`.
#[derive(Clone)]
pub struct TokenRecord {
    access_token: Option<SecretString>,
    id_token: Option<SecretString>,
    token_type: Option<String>,
    refresh_token: Option<SecretString>,
    expires_in: Option<u64>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Build from a response received now.
    pub fn from_response(response: TokenResponse) -> Self {
        Self::issued_at(response, Utc::now())
    }

    /// Build from a response received at `issued_at`.
    pub fn issued_at(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = response.expires_in.and_then(|secs| {
            i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        });

        Self {
            access_token: response.access_token.map(SecretString::new),
            id_token: response.id_token.map(SecretString::new),
            token_type: response.token_type,
            refresh_token: response.refresh_token.map(SecretString::new),
            expires_in: response.expires_in,
            expires_at,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.expose_secret().as_str())
    }

    /// Lifetime in seconds as reported by the provider.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Absolute expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the access token is past its expiry. Records without an
    /// expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| exp <= Utc::now())
            .unwrap_or(false)
    }

    /// Get remaining lifetime in seconds, floored at zero.
    pub fn remaining_lifetime(&self) -> Option<i64> {
        self.expires_at.map(|exp| {
            let now = Utc::now();
            if exp > now {
                (exp - now).num_seconds()
            } else {
                0
            }
        })
    }
}

impl From<TokenResponse> for TokenRecord {
    fn from(response: TokenResponse) -> Self {
        Self::from_response(response)
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<SecretString>| t.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TokenRecord")
            .field("access_token", &redact(&self.access_token))
            .field("id_token", &redact(&self.id_token))
            .field("token_type", &self.token_type)
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Grant-specific fields of a token request. Unset fields are left out of
/// the request body.
#[derive(Clone, Default)]
pub struct TokenParams {
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub redirect_uri: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<Scope>,
}

impl TokenParams {
    /// Authorization code exchange.
    pub fn authorization_code(code: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Default::default()
        }
    }

    /// Client credentials request.
    pub fn client_credentials(scope: Option<Scope>) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }

    /// Refresh token exchange.
    pub fn refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: Some(refresh_token.into()),
            ..Default::default()
        }
    }

    /// Attach the PKCE verifier.
    pub fn with_code_verifier(mut self, code_verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(code_verifier.into());
        self
    }

    /// Attach a scope.
    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

impl fmt::Debug for TokenParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| t.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TokenParams")
            .field("code", &redact(&self.code))
            .field("code_verifier", &redact(&self.code_verifier))
            .field("redirect_uri", &self.redirect_uri)
            .field("refresh_token", &redact(&self.refresh_token))
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let json = r#"{
            "access_token": "eyJra1example",
            "id_token": "eyJra2example",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": null
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, Some("eyJra1example".to_string()));
        assert_eq!(response.id_token, Some("eyJra2example".to_string()));
        assert_eq!(response.token_type, Some("Bearer".to_string()));
        assert_eq!(response.expires_in, Some(7200));
        assert_eq!(response.refresh_token, None);
    }

    #[test]
    fn test_expires_at_is_issue_time_plus_lifetime() {
        let issued_at = Utc::now();
        let record = TokenRecord::issued_at(
            TokenResponse {
                expires_in: Some(3600),
                ..Default::default()
            },
            issued_at,
        );

        assert_eq!(record.expires_in(), Some(3600));
        assert_eq!(record.expires_at(), Some(issued_at + Duration::seconds(3600)));
    }

    #[test]
    fn test_unrepresentable_lifetime_has_no_expiry() {
        let record = TokenRecord::from_response(TokenResponse {
            expires_in: Some(u64::MAX),
            ..Default::default()
        });

        assert_eq!(record.expires_in(), Some(u64::MAX));
        assert_eq!(record.expires_at(), None);
        assert!(!record.is_expired());
    }

    #[test]
    fn test_empty_response_yields_absent_fields() {
        let record: TokenRecord = serde_json::from_str::<TokenResponse>("{}").unwrap().into();

        assert_eq!(record.access_token(), None);
        assert_eq!(record.id_token(), None);
        assert_eq!(record.token_type(), None);
        assert_eq!(record.refresh_token(), None);
        assert_eq!(record.expires_in(), None);
        assert_eq!(record.expires_at(), None);
        assert!(!record.is_expired());
        assert_eq!(record.remaining_lifetime(), None);
    }

    #[test]
    fn test_is_expired() {
        let past = Utc::now() - Duration::seconds(120);
        let expired = TokenRecord::issued_at(
            TokenResponse {
                expires_in: Some(60),
                ..Default::default()
            },
            past,
        );
        assert!(expired.is_expired());
        assert_eq!(expired.remaining_lifetime(), Some(0));

        let fresh = TokenRecord::from_response(TokenResponse {
            expires_in: Some(3600),
            ..Default::default()
        });
        assert!(!fresh.is_expired());
        assert!(fresh.remaining_lifetime().unwrap() > 3500);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let record = TokenRecord::from_response(TokenResponse {
            access_token: Some("eyJra1example".to_string()),
            token_type: Some("Bearer".to_string()),
            ..Default::default()
        });
        let debug = format!("{:?}", record);
        assert!(!debug.contains("eyJra1example"));
        assert!(debug.contains("Bearer"));
    }

    #[test]
    fn test_token_params_constructors() {
        let params = TokenParams::authorization_code("code1", "https://example.com/cb")
            .with_code_verifier("CODE_VERIFIER");
        assert_eq!(params.code.as_deref(), Some("code1"));
        assert_eq!(params.code_verifier.as_deref(), Some("CODE_VERIFIER"));
        assert!(params.refresh_token.is_none());

        let params = TokenParams::client_credentials(None).with_scope(["openid", "email"]);
        assert_eq!(params.scope.unwrap().to_param(), "openid email");
    }
}
