//! Identity Types
//!
//! Core type definitions for the hosted identity provider.

pub mod auth;
pub mod config;
pub mod outcome;
pub mod token;
pub mod user;

pub use auth::*;
pub use config::*;
pub use outcome::*;
pub use token::*;
pub use user::*;
