//! Authentication primitives.
//!
//! - [`jwt`] -- access-token generation and validation.
//!
//! Users are managed by an external identity service; this crate only
//! verifies the tokens it issues.

pub mod jwt;
