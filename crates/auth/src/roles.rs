use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role label stored on the user account (e.g. "Infirmier", "Responsable").
///
/// Roles are opaque strings; only the manager and admin labels carry extra
/// permissions (see [`crate::permissions_for_role`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const RESPONSABLE: &'static str = "Responsable";
    pub const ADMINISTRATEUR: &'static str = "Administrateur";
    pub const SUPER_ADMIN: &'static str = "SuperAdmin";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unit managers see stock overview and checklist history.
    pub fn is_manager(&self) -> bool {
        matches!(
            self.as_str(),
            Self::RESPONSABLE | Self::ADMINISTRATEUR | Self::SUPER_ADMIN
        )
    }

    /// Administrators may delete archived records.
    pub fn is_admin(&self) -> bool {
        matches!(self.as_str(), Self::ADMINISTRATEUR | Self::SUPER_ADMIN)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
