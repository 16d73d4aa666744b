//! Builders
//!
//! Fluent builder patterns for identity client configuration.

pub mod config;

pub use config::{identity_config, IdentityConfigBuilder};
