//! Hosted Identity Provider Integration Module
//!
//! Client for the OAuth2/OIDC endpoints of a hosted authorization-server
//! domain (Amazon Cognito style `https://{domain}/oauth2/...`).
//!
//! # Features
//!
//! - Authorization redirect (RFC 6749 Section 4.1.1), with PKCE (RFC 7636)
//! - Authorization Code exchange (RFC 6749 Section 4.1.3)
//! - Client Credentials (RFC 6749 Section 4.4)
//! - Token Refresh (RFC 6749 Section 6)
//! - OIDC UserInfo
//! - Logout redirect
//!
//! # Example
//!
//! ```rust,ignore
//! use cognito_idp_integration::{identity_config, IdentityClient, Outcome, PkceMethod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = identity_config()
//!         .client_id("my-client-id")
//!         .domain("auth.example.com")
//!         .build()?;
//!     let client = IdentityClient::new(config);
//!
//!     let pkce = client.generate_pkce(PkceMethod::S256);
//!     let uri = client.authorization_uri(
//!         "https://myapp.com/callback",
//!         cognito_idp_integration::AuthorizationOptions {
//!             scope: Some(["openid", "email"].into()),
//!             code_challenge: Some(pkce.code_challenge.clone()),
//!             code_challenge_method: Some(pkce.code_challenge_method),
//!             ..Default::default()
//!         },
//!     );
//!     println!("Sign in at: {}", uri);
//!
//!     // ...after the redirect back with ?code=...
//!     match client
//!         .exchange_code_with_pkce("code", &pkce.code_verifier, "https://myapp.com/callback")
//!         .await?
//!     {
//!         Outcome::Granted(token) => {
//!             let user = client.user_info(&token).await?.ok();
//!             println!("Signed in: {:?}", user.and_then(|u| u.email().map(String::from)));
//!         }
//!         Outcome::Rejected(rejection) => println!("Rejected: {:?}", rejection.error_code()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, token, claim and outcome types
//! - `error`: error hierarchy for failures that never reached the provider
//! - `core`: HTTP transport, form encoding, PKCE
//! - `flows`: authorization and logout redirect builders
//! - `builders`: fluent configuration builder
//! - `client`: `IdentityClient`, tying the above together

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod types;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main client
pub use client::IdentityClient;

// Re-export builders
pub use builders::{identity_config, IdentityConfigBuilder};

// Re-export errors
pub use error::{
    parse_error_response, ConfigurationError, IdentityError, IdentityResult, NetworkError,
    ProtocolError, ProviderErrorResponse,
};

// Re-export types
pub use types::{
    // Config
    ClientCredentials, GrantType, IdentityConfig, ProviderEndpoints,
    // Auth
    AuthorizationOptions, LogoutOptions, PkceMethod, PkceParams, ResponseType, Scope,
    // Token
    TokenParams, TokenRecord, TokenResponse,
    // User
    ClaimValue, UserIdentity,
    // Outcome
    AccessTokenSource, Outcome, Rejection,
};

// Re-export flows
pub use flows::{AuthorizationRequest, LogoutRequest};

// Re-export core components
pub use crate::core::{
    // Transport
    HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // PKCE
    compute_challenge, DefaultPkceGenerator, PkceGenerator,
    // Form
    FormParams,
};
