//! Call Outcomes
//!
//! Results of provider calls that reached the provider.

use crate::error::ProviderErrorResponse;

use super::TokenRecord;

/// What the provider answered.
///
/// A non-2xx answer is `Rejected`, not an error: transport failures are
/// reported separately through [`crate::error::IdentityError`].
#[derive(Clone, Debug)]
pub enum Outcome<T> {
    Granted(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    /// The granted value, discarding any rejection.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Granted(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn as_granted(&self) -> Option<&T> {
        match self {
            Self::Granted(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Granted(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Granted(value) => Outcome::Granted(f(value)),
            Self::Rejected(rejection) => Outcome::Rejected(rejection),
        }
    }
}

/// A provider refusal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP status code.
    pub status: u16,
    /// OAuth2 error document, when the body was one.
    pub error: Option<ProviderErrorResponse>,
}

impl Rejection {
    /// OAuth2 `error` code, e.g. `invalid_grant`.
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.error.as_str())
    }
}

/// Access token to present at the UserInfo endpoint.
#[derive(Clone, Debug)]
pub enum AccessTokenSource {
    /// A bare access token string.
    Raw(String),
    /// A record returned by a token exchange.
    Issued(TokenRecord),
}

impl AccessTokenSource {
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::Raw(token) => Some(token),
            Self::Issued(record) => record.access_token(),
        }
    }
}

impl From<&str> for AccessTokenSource {
    fn from(token: &str) -> Self {
        Self::Raw(token.to_string())
    }
}

impl From<String> for AccessTokenSource {
    fn from(token: String) -> Self {
        Self::Raw(token)
    }
}

impl From<TokenRecord> for AccessTokenSource {
    fn from(record: TokenRecord) -> Self {
        Self::Issued(record)
    }
}

impl From<&TokenRecord> for AccessTokenSource {
    fn from(record: &TokenRecord) -> Self {
        Self::Issued(record.clone())
    }
}
