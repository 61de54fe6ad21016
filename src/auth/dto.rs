use serde::{Deserialize, Serialize};

use crate::users::dto::PublicUser;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, alias = "fname", alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lname", alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "pwd")]
    pub password: String,
    #[serde(default, alias = "pwdConfirm", alias = "passwordConfirmation")]
    pub password_confirmation: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "pwd")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub new_password_confirmation: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64, // seconds
    pub user: PublicUser,
}
