use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::{
    repo::{StoreError, UserRepo},
    repo_types::{NewUser, ProfileUpdate, User},
};

/// In-process `UserRepo` with the same unique-email rule as the `users` table.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    fn with_users<T>(&self, f: impl FnOnce(&mut Vec<User>) -> T) -> T {
        let mut guard = self.users.lock().expect("memory repo lock");
        f(&mut guard)
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, new: &NewUser) -> Result<User, StoreError> {
        self.with_users(|users| {
            if users.iter().any(|u| u.email == new.email) {
                return Err(StoreError::UniqueViolation);
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: Uuid::new_v4(),
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.with_users(|users| users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.with_users(|users| users.iter().find(|u| u.id == id).cloned()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.with_users(|users| {
            let mut out = users.clone();
            out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            out
        }))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        self.with_users(|users| {
            let Some(idx) = users.iter().position(|u| u.id == id) else {
                return Ok(None);
            };
            if users.iter().any(|u| u.id != id && u.email == update.email) {
                return Err(StoreError::UniqueViolation);
            }
            let user = &mut users[idx];
            user.first_name = update.first_name.clone();
            user.last_name = update.last_name.clone();
            user.email = update.email.clone();
            user.updated_at = OffsetDateTime::now_utc();
            Ok(Some(user.clone()))
        })
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.with_users(|users| match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = OffsetDateTime::now_utc();
                true
            }
            None => false,
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.with_users(|users| {
            let before = users.len();
            users.retain(|u| u.id != id);
            users.len() != before
        }))
    }
}
