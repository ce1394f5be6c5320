//! User accounts and credential checks.
//!
//! Accounts are provisioned out of band and read-only at runtime; the only
//! operation here is verifying a login attempt against a stored argon2 hash.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chariot_core::{Entity, Username};

use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl Entity for UserAccount {
    type Id = Username;

    fn id(&self) -> &Self::Id {
        &self.username
    }
}

impl UserAccount {
    /// Name shown in the UI and stamped on audit records.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user or wrong password; deliberately not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a login attempt. `account` is the lookup result for the submitted
/// username.
pub fn check_login<'a>(
    account: Option<&'a UserAccount>,
    password: &str,
) -> Result<&'a UserAccount, AuthError> {
    let Some(account) = account else {
        tracing::debug!("login attempt for unknown user");
        return Err(AuthError::InvalidCredentials);
    };

    let parsed = PasswordHash::new(&account.password_hash).map_err(|e| {
        tracing::warn!(user = %account.username, error = %e, "stored password hash is malformed");
        AuthError::InvalidCredentials
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)?;

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(password: &str) -> UserAccount {
        UserAccount {
            username: "nadia".parse().unwrap(),
            first_name: "Nadia".to_string(),
            last_name: "Alaoui".to_string(),
            role: Role::new("Infirmier"),
            password_hash: hash_password(password).unwrap(),
        }
    }

    #[test]
    fn correct_password_logs_in() {
        let acc = account("s3cret");
        let user = check_login(Some(&acc), "s3cret").unwrap();
        assert_eq!(user.display_name(), "Nadia Alaoui");
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let acc = account("s3cret");
        assert_eq!(check_login(Some(&acc), "nope"), Err(AuthError::InvalidCredentials));
        assert_eq!(check_login(None, "s3cret"), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn malformed_hash_is_rejected() {
        let mut acc = account("x");
        acc.password_hash = "plaintext".to_string();
        assert_eq!(check_login(Some(&acc), "plaintext"), Err(AuthError::InvalidCredentials));
    }
}
