use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Request body for editing a user. Accepts the old form field names too.
#[derive(Debug, Deserialize)]
pub struct EditUserRequest {
    #[serde(default, alias = "fname", alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lname", alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}
