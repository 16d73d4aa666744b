//! Core Components
//!
//! Transport, form encoding and PKCE primitives shared by the flows.

pub mod form;
pub mod pkce;
pub mod transport;

pub use form::*;
pub use pkce::*;
pub use transport::*;
