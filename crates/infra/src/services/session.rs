use tracing::instrument;

use chariot_auth::{AuthError, UserAccount, check_login};
use chariot_core::Username;

use super::{ChariotServices, ServiceResult};
use crate::store::fetch;

impl ChariotServices {
    /// Check credentials and return the account.
    #[instrument(skip(self, password), err)]
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<UserAccount> {
        let Ok(username) = username.parse::<Username>() else {
            return Err(AuthError::InvalidCredentials.into());
        };
        let account = fetch::<UserAccount>(self.store(), &username).await?;
        let user = check_login(account.as_ref(), password)?;
        tracing::info!(user = %user.username, role = %user.role, "login");
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ServiceError, fixtures::services_with};
    use super::*;

    #[tokio::test]
    async fn login_accepts_good_password_only() {
        let svc = services_with(vec![]).await;

        let user = svc.login("sara", "chariot").await.unwrap();
        assert_eq!(user.display_name(), "Sara Idrissi");

        for (u, p) in [("sara", "wrong"), ("nobody", "chariot"), ("", "chariot")] {
            assert!(matches!(
                svc.login(u, p).await,
                Err(ServiceError::Auth(AuthError::InvalidCredentials))
            ));
        }
    }
}
