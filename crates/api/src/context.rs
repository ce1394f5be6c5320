use chariot_auth::Principal;
use chariot_core::Username;

/// Authenticated caller for a request, inserted by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn username(&self) -> &Username {
        &self.principal.username
    }

    /// Name stamped on audit records.
    pub fn display_name(&self) -> &str {
        &self.principal.display_name
    }
}
