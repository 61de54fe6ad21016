use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::verify_password_async,
    },
    error::{AppError, AppResult},
    state::AppState,
    users::{repo_types::User, services::CredentialStore},
};

/// A freshly signed bearer token and the user it was issued to.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: Duration,
    pub user: User,
}

/// Checks credentials against the store and issues signed tokens.
///
/// Each call is one `Unauthenticated -> Authenticated | failed` step; there
/// is no refresh, no second factor and no internal retry.
#[derive(Clone)]
pub struct Authenticator {
    users: CredentialStore,
    keys: JwtKeys,
    dummy_hash: Arc<str>,
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl Authenticator {
    /// `dummy_hash` comes from `password::dummy_hash_async`, computed before
    /// the first request.
    pub fn new(users: CredentialStore, keys: JwtKeys, dummy_hash: String) -> Self {
        Self {
            users,
            keys,
            dummy_hash: dummy_hash.into(),
        }
    }

    /// Fails on missing fields or mismatched confirmation before any store access.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> AppResult<User> {
        let blank_field = [first_name, last_name, email]
            .iter()
            .any(|f| f.trim().is_empty());
        if blank_field || password.is_empty() || password_confirmation.is_empty() {
            return Err(AppError::MissingFields);
        }
        if password != password_confirmation {
            return Err(AppError::PasswordMismatch);
        }
        let user = self
            .users
            .create_user(first_name, last_name, email, password)
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password both end in `InvalidCredentials`,
    /// after exactly one Argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::MissingFields);
        }

        let user = match self.users.find_by_email(email).await {
            Ok(u) => u,
            Err(AppError::NotFound) => {
                self.verify_dummy(password).await;
                warn!("login unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let ok = verify_password_async(password.to_owned(), user.password_hash.clone()).await?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(IssuedToken {
            token,
            expires_in: self.keys.ttl,
            user,
        })
    }

    /// Burns one verification against the startup hash; the outcome is ignored.
    async fn verify_dummy(&self, plain: &str) -> bool {
        verify_password_async(plain.to_owned(), self.dummy_hash.to_string())
            .await
            .unwrap_or(false)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Uuid> {
        self.keys.verify(token).map(|claims| claims.sub).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("invalid or expired token".into())
        })
    }

    /// Requires the current password; the new one always goes through a fresh hash.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
        new_password_confirmation: &str,
    ) -> AppResult<()> {
        if current_password.is_empty()
            || new_password.is_empty()
            || new_password_confirmation.is_empty()
        {
            return Err(AppError::MissingFields);
        }
        if new_password != new_password_confirmation {
            return Err(AppError::PasswordMismatch);
        }

        let user = self.users.find_by_id(user_id).await?;
        let ok = verify_password_async(current_password.to_owned(), user.password_hash).await?;
        if !ok {
            warn!(user_id = %user_id, "change password with wrong current password");
            return Err(AppError::InvalidCredentials);
        }
        self.users.change_password(user_id, new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::config::JwtConfig;
    use crate::users::memory::MemoryUserRepo;

    fn make_auth() -> (Authenticator, CredentialStore) {
        make_auth_with_dummy(hash_password("dummy").expect("dummy hash"))
    }

    fn make_auth_with_dummy(dummy_hash: String) -> (Authenticator, CredentialStore) {
        let users = CredentialStore::new(
            Arc::new(MemoryUserRepo::default()),
            Duration::from_secs(5),
        );
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        });
        (Authenticator::new(users.clone(), keys, dummy_hash), users)
    }

    async fn register_ann(auth: &Authenticator) -> User {
        auth.register("Ann", "Lee", "ann@x.com", "p@ss1234", "p@ss1234")
            .await
            .expect("register ann")
    }

    #[tokio::test]
    async fn ann_lee_scenario() {
        let (auth, users) = make_auth();

        let ann = register_ann(&auth).await;
        assert_ne!(ann.password_hash, "p@ss1234");

        let again = auth
            .register("Ann", "Lee", "ann@x.com", "p@ss1234", "p@ss1234")
            .await;
        assert!(matches!(again, Err(AppError::DuplicateEmail)));
        assert_eq!(users.list_users().await.expect("list").len(), 1);

        let issued = auth.login("ann@x.com", "p@ss1234").await.expect("login");
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, Duration::from_secs(3600));

        let wrong = auth.login("ann@x.com", "wrong").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn issued_token_verifies_to_registered_id() {
        let (auth, _) = make_auth();
        let ann = register_ann(&auth).await;
        let issued = auth.login("ann@x.com", "p@ss1234").await.expect("login");
        assert_eq!(issued.user.id, ann.id);
        assert_eq!(auth.verify_token(&issued.token).expect("verify"), ann.id);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let (auth, _) = make_auth();
        register_ann(&auth).await;

        let wrong_pw = auth.login("ann@x.com", "not-her-password").await.unwrap_err();
        let no_user = auth.login("nobody@x.com", "not-her-password").await.unwrap_err();
        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(no_user, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.status(), no_user.status());
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn unknown_email_verifies_against_the_startup_hash() {
        let (auth, _) = make_auth_with_dummy(hash_password("ghost-pass").expect("hash"));
        let before = auth.dummy_hash.clone();

        // Even a password matching the dummy hash is refused.
        let first = auth.login("ghost@x.com", "ghost-pass").await;
        assert!(matches!(first, Err(AppError::InvalidCredentials)));
        assert!(Arc::ptr_eq(&before, &auth.dummy_hash));

        assert!(auth.verify_dummy("ghost-pass").await);
        assert!(!auth.verify_dummy("other").await);
    }

    #[tokio::test]
    async fn login_email_is_case_insensitive() {
        let (auth, _) = make_auth();
        register_ann(&auth).await;
        assert!(auth.login("  ANN@X.COM ", "p@ss1234").await.is_ok());
    }

    #[tokio::test]
    async fn register_checks_before_touching_store() {
        let (auth, users) = make_auth();
        assert!(matches!(
            auth.register("Ann", "Lee", "ann@x.com", "p@ss1234", "p@ss12345")
                .await,
            Err(AppError::PasswordMismatch)
        ));
        assert!(matches!(
            auth.register("", "Lee", "ann@x.com", "p@ss1234", "p@ss1234")
                .await,
            Err(AppError::MissingFields)
        ));
        assert!(matches!(
            auth.register("Ann", "Lee", "ann@x.com", "p@ss1234", "").await,
            Err(AppError::MissingFields)
        ));
        assert!(users.list_users().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (auth, _) = make_auth();
        assert!(matches!(
            auth.login("", "p@ss1234").await,
            Err(AppError::MissingFields)
        ));
        assert!(matches!(
            auth.login("ann@x.com", "").await,
            Err(AppError::MissingFields)
        ));
    }

    #[tokio::test]
    async fn change_password_requires_current_one() {
        let (auth, _) = make_auth();
        let ann = register_ann(&auth).await;

        let err = auth
            .change_password(ann.id, "guess", "n3w-p@ssword", "n3w-p@ssword")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        auth.change_password(ann.id, "p@ss1234", "n3w-p@ssword", "n3w-p@ssword")
            .await
            .expect("change");
        assert!(matches!(
            auth.login("ann@x.com", "p@ss1234").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(auth.login("ann@x.com", "n3w-p@ssword").await.is_ok());
    }

    #[tokio::test]
    async fn change_password_confirmation_must_match() {
        let (auth, _) = make_auth();
        let ann = register_ann(&auth).await;
        assert!(matches!(
            auth.change_password(ann.id, "p@ss1234", "n3w-p@ssword", "n3w-p@sswordX")
                .await,
            Err(AppError::PasswordMismatch)
        ));
    }

    #[test]
    fn verify_token_rejects_garbage() {
        let (auth, _) = make_auth();
        assert!(matches!(
            auth.verify_token("not.a.jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
