//! JWT and password authentication for Resonate.
//!
//! This crate provides:
//! - JWT access/refresh token generation and validation
//! - Argon2 password hashing and verification

mod error;
mod jwt;
mod password;

pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default access token expiration time in hours.
pub const DEFAULT_ACCESS_EXPIRATION_HOURS: u64 = 24;

/// Default refresh token expiration time in hours.
pub const DEFAULT_REFRESH_EXPIRATION_HOURS: u64 = 24 * 7;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "resonate";
