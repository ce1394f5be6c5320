use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "inventory.read").
/// The wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const INVENTORY_READ: &'static str = "inventory.read";
    pub const CONSUMPTION_COMMIT: &'static str = "consumption.commit";
    pub const REPLACEMENT_COMMIT: &'static str = "replacement.commit";
    pub const LOGS_READ: &'static str = "logs.read";
    pub const LOGS_DELETE: &'static str = "logs.delete";
    pub const CHECKLISTS_RUN: &'static str = "checklists.run";
    pub const CHECKLISTS_READ: &'static str = "checklists.read";
    pub const CHECKLISTS_HISTORY: &'static str = "checklists.history";
    pub const CHECKLISTS_DELETE: &'static str = "checklists.delete";
    pub const STOCK_OVERVIEW: &'static str = "stock.overview";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static role → permission policy.
///
/// Every authenticated user can use the cart; managers additionally get the
/// overview screens; admins get everything.
pub fn permissions_for_role(role: &Role) -> Vec<Permission> {
    if role.is_admin() {
        return vec![Permission::new("*")];
    }

    let mut perms: Vec<Permission> = [
        Permission::INVENTORY_READ,
        Permission::CONSUMPTION_COMMIT,
        Permission::REPLACEMENT_COMMIT,
        Permission::LOGS_READ,
        Permission::CHECKLISTS_RUN,
        Permission::CHECKLISTS_READ,
    ]
    .into_iter()
    .map(Permission::new)
    .collect();

    if role.is_manager() {
        perms.push(Permission::new(Permission::STOCK_OVERVIEW));
        perms.push(Permission::new(Permission::CHECKLISTS_HISTORY));
    }

    perms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(perms: &[Permission], p: &str) -> bool {
        perms.iter().any(|x| x.as_str() == p || x.is_wildcard())
    }

    #[test]
    fn staff_can_use_the_cart_but_not_delete() {
        let perms = permissions_for_role(&Role::new("Infirmier"));
        assert!(has(&perms, Permission::CONSUMPTION_COMMIT));
        assert!(!has(&perms, Permission::STOCK_OVERVIEW));
        assert!(!has(&perms, Permission::LOGS_DELETE));
    }

    #[test]
    fn managers_get_overview() {
        let perms = permissions_for_role(&Role::new("Responsable"));
        assert!(has(&perms, Permission::STOCK_OVERVIEW));
        assert!(has(&perms, Permission::CHECKLISTS_HISTORY));
        assert!(!has(&perms, Permission::CHECKLISTS_DELETE));
    }

    #[test]
    fn admins_get_wildcard() {
        let perms = permissions_for_role(&Role::new("SuperAdmin"));
        assert_eq!(perms, vec![Permission::new("*")]);
    }
}
