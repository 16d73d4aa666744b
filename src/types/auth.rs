//! Authorization Types
//!
//! Option sets for the authorization and logout redirects, plus the scope,
//! response type and PKCE values they carry.

use std::fmt;

/// Requested scope: a single space-delimited string or an ordered list.
///
/// Both forms serialize to the same wire value, list elements joined by a
/// single space in the order given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Single(String),
    List(Vec<String>),
}

impl Scope {
    /// Wire representation.
    pub fn to_param(&self) -> String {
        match self {
            Self::Single(scope) => scope.clone(),
            Self::List(scopes) => scopes.join(" "),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_param())
    }
}

impl From<&str> for Scope {
    fn from(scope: &str) -> Self {
        Self::Single(scope.to_string())
    }
}

impl From<String> for Scope {
    fn from(scope: String) -> Self {
        Self::Single(scope)
    }
}

impl From<Vec<String>> for Scope {
    fn from(scopes: Vec<String>) -> Self {
        Self::List(scopes)
    }
}

impl From<Vec<&str>> for Scope {
    fn from(scopes: Vec<&str>) -> Self {
        Self::List(scopes.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Scope {
    fn from(scopes: [&str; N]) -> Self {
        Self::List(scopes.iter().map(|s| s.to_string()).collect())
    }
}

/// OAuth2 response type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Authorization code grant.
    #[default]
    Code,
    /// Implicit grant.
    Token,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }
}

/// PKCE challenge method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PkceMethod {
    /// SHA-256 hash (recommended).
    #[default]
    S256,
    /// Plain text (not recommended).
    Plain,
}

impl PkceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

/// PKCE parameters.
#[derive(Clone)]
pub struct PkceParams {
    /// Code verifier (keep secret, send at token exchange).
    pub code_verifier: String,
    /// Code challenge (sent in authorization URL).
    pub code_challenge: String,
    /// Challenge method used.
    pub code_challenge_method: PkceMethod,
}

impl fmt::Debug for PkceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceParams")
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .field("code_challenge_method", &self.code_challenge_method)
            .finish()
    }
}

/// Optional parameters of the authorization redirect.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationOptions {
    /// Response type (`code` when unset).
    pub response_type: Option<ResponseType>,
    /// PKCE code challenge.
    pub code_challenge: Option<String>,
    /// PKCE challenge method.
    pub code_challenge_method: Option<PkceMethod>,
    /// Federated identity provider name.
    pub identity_provider: Option<String>,
    /// Identifier mapped to a federated identity provider.
    pub idp_identifier: Option<String>,
    /// OIDC nonce.
    pub nonce: Option<String>,
    /// Requested scopes.
    pub scope: Option<Scope>,
    /// Opaque state, passed through unchanged.
    pub state: Option<String>,
}

/// Optional parameters of the logout redirect.
#[derive(Clone, Debug, Default)]
pub struct LogoutOptions {
    /// Where to send the user after sign-out.
    pub logout_uri: Option<String>,
    /// Redirect URI for signing a user back in after sign-out.
    pub redirect_uri: Option<String>,
    /// Response type for the sign-in redirect.
    pub response_type: Option<ResponseType>,
    /// Requested scopes for the sign-in redirect.
    pub scope: Option<Scope>,
    /// Opaque state, passed through unchanged.
    pub state: Option<String>,
}
