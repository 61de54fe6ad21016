use std::fmt;

use anyhow::Context;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub store_timeout_secs: u64,
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        // Required, there is no built-in secret.
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userdir".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userdir-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };
        Ok(Self {
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            store_timeout_secs: env_or("STORE_TIMEOUT_SECS", 5),
            jwt,
        })
    }
}
