//! Redirect Flows
//!
//! Browser-facing redirect URIs of the hosted UI:
//!
//! - **Authorization** (RFC 6749 Section 4.1.1, RFC 7636): sign-in redirect
//! - **Logout**: sign-out redirect, optionally followed by a new sign-in

pub mod authorization;
pub mod logout;

pub use authorization::AuthorizationRequest;
pub use logout::LogoutRequest;
