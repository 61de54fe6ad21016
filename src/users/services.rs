use std::{future::Future, sync::Arc, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::password::hash_password_async,
    error::{AppError, AppResult},
    users::{
        repo::{StoreError, UserRepo},
        repo_types::{NewUser, ProfileUpdate, User},
    },
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_new_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::MissingFields);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl ProfileUpdate {
    /// Trims names, normalizes the email and rejects blanks.
    pub fn parse(first_name: &str, last_name: &str, email: &str) -> AppResult<Self> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        let email = normalize_email(email);
        if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(AppError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(AppError::Validation("invalid email".into()));
        }
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
        })
    }
}

/// Owns user records and keeps plaintext passwords out of the store.
///
/// Three explicit write paths: `create_user` always hashes,
/// `update_profile` never touches the hash, `change_password` always
/// re-hashes.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepo>,
    timeout: Duration,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepo>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    /// Runs one store call under the request timeout and maps its failure.
    async fn call<T, F>(&self, op: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(StoreError::UniqueViolation)) => Err(AppError::DuplicateEmail),
            Ok(Err(StoreError::Unavailable(msg))) => {
                warn!(op, error = %msg, "store unavailable");
                Err(AppError::StoreUnavailable)
            }
            Ok(Err(StoreError::Other(e))) => Err(AppError::Internal(e.context(op))),
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(op, timeout_ms, "store call timed out");
                Err(AppError::StoreUnavailable)
            }
        }
    }

    pub async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<User> {
        let profile = ProfileUpdate::parse(first_name, last_name, email)?;
        validate_new_password(password)?;

        let password_hash = hash_password_async(password.to_owned()).await?;
        let new = NewUser {
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            password_hash,
        };
        let user = self.call("insert user", self.repo.insert(&new)).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        self.call("find user by email", self.repo.find_by_email(&email))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        self.call("find user by id", self.repo.find_by_id(id))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.call("list users", self.repo.list()).await
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let user = self
            .call("update user profile", self.repo.update_profile(id, &update))
            .await?
            .ok_or(AppError::NotFound)?;
        info!(user_id = %user.id, "user profile updated");
        Ok(user)
    }

    pub async fn change_password(&self, id: Uuid, new_password: &str) -> AppResult<()> {
        validate_new_password(new_password)?;
        let password_hash = hash_password_async(new_password.to_owned()).await?;
        let updated = self
            .call(
                "update password hash",
                self.repo.update_password_hash(id, &password_hash),
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }
        info!(user_id = %id, "password changed");
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        if !self.call("delete user", self.repo.delete(id)).await? {
            return Err(AppError::NotFound);
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
