use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chariot_core::Username;

use crate::{Role, UserAccount};

/// Session token claims (transport-agnostic).
///
/// Timestamps are Unix seconds so the token stays a standard JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: login identifier.
    pub sub: Username,

    /// Display name stamped on audit records.
    pub name: String,

    pub role: Role,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_user(user: &UserAccount, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.username.clone(),
            name: user.display_name(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification lives in
/// [`crate::SessionCodec`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: "karim".parse().unwrap(),
            name: "Karim Tazi".to_string(),
            role: Role::new("Infirmier"),
            iat,
            exp,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn window_is_enforced() {
        assert_eq!(validate_claims(&claims(100, 200), at(150)), Ok(()));
        assert_eq!(validate_claims(&claims(100, 200), at(200)), Err(TokenValidationError::Expired));
        assert_eq!(validate_claims(&claims(100, 200), at(50)), Err(TokenValidationError::NotYetValid));
        assert_eq!(
            validate_claims(&claims(200, 200), at(200)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
