//! `chariot-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: callers load
//! the `UserAccount` and hand it in.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use permissions::{permissions_for_role, Permission};
pub use roles::Role;
pub use token::{SessionCodec, TokenError};
pub use user::{check_login, hash_password, AuthError, UserAccount};
