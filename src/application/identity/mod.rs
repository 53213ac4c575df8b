//! Identity module: credentials, signup and token issuance
//!
//! Contains the `AuthService` which verifies credentials against the user
//! repository and issues JWTs for the marketplace API.

pub mod service;

pub use service::{AuthOutcome, AuthResult, AuthService};
