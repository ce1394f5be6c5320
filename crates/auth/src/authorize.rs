use std::collections::HashSet;

use thiserror::Error;

use chariot_core::Username;

use crate::{permissions_for_role, Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from verified session claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: Username,
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(username: Username, display_name: impl Into<String>, role: Role) -> Self {
        let permissions = permissions_for_role(&role);
        Self {
            username,
            display_name: display_name.into(),
            role,
            permissions,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &str) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: &'static str) -> Principal {
        Principal::new("nadia".parse().unwrap(), "Nadia Alaoui", Role::new(role))
    }

    #[test]
    fn staff_is_denied_admin_actions() {
        let p = principal("Infirmier");
        assert!(authorize(&p, Permission::LOGS_READ).is_ok());
        assert_eq!(
            authorize(&p, Permission::LOGS_DELETE),
            Err(AuthzError::Forbidden("logs.delete".to_string()))
        );
    }

    #[test]
    fn wildcard_allows_everything() {
        let p = principal("Administrateur");
        assert!(authorize(&p, Permission::CHECKLISTS_DELETE).is_ok());
        assert!(authorize(&p, "anything.else").is_ok());
    }
}
