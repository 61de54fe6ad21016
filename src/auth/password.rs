use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

const DUMMY_PASSWORD: &str = "userdir-dummy-password";

/// Argon2id with the crate defaults (m=19 MiB, t=2, p=1) and a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Output comparison inside `verify_password` is constant-time.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash_password_async(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| anyhow::anyhow!("hash task join error: {e}"))?
}

pub async fn verify_password_async(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("verify task join error: {e}"))?
}

/// Hashed once at startup. A login for an unknown email verifies against it,
/// so that path costs one Argon2 run like a real mismatch does.
pub async fn dummy_hash_async() -> anyhow::Result<String> {
    hash_password_async(DUMMY_PASSWORD.to_owned()).await
}
