//! Account service — email/password registration and login.
//!
//! Password hashes are salted SHA-256 with a per-user random salt. Login
//! failures are deliberately indistinguishable between "no such account" and
//! "wrong password".

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::services::session::bytes_to_hex;

const MIN_PASSWORD_LEN: usize = 8;
const SALT_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    BadCredentials,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for AccountError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::WeakPassword => "E_WEAK_PASSWORD",
            Self::EmailTaken => "E_EMAIL_TAKEN",
            Self::BadCredentials => "E_BAD_CREDENTIALS",
            Self::Db(_) => "E_DATABASE",
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

pub(crate) fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

fn generate_salt() -> String {
    let bytes: [u8; SALT_LEN] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Register a new account. Returns the new user id.
///
/// # Errors
///
/// `InvalidEmail` / `WeakPassword` before any write, `EmailTaken` on a
/// duplicate, database errors otherwise.
pub async fn register(pool: &PgPool, email: &str, password: &str, name: &str) -> Result<Uuid, AccountError> {
    let Some(email) = normalize_email(email) else {
        return Err(AccountError::InvalidEmail);
    };
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(AccountError::EmailTaken);
    }

    let id = Uuid::new_v4();
    let salt = generate_salt();
    let name = if name.trim().is_empty() { email.clone() } else { name.trim().to_string() };
    sqlx::query("INSERT INTO users (id, email, name, password_salt, password_hash) VALUES ($1, $2, $3, $4, $5)")
        .bind(id)
        .bind(&email)
        .bind(&name)
        .bind(&salt)
        .bind(hash_password(password, &salt))
        .execute(pool)
        .await?;

    tracing::info!(%id, "account registered");
    Ok(id)
}

/// Verify credentials. Returns the user id on success.
///
/// # Errors
///
/// `BadCredentials` for unknown email or wrong password alike.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<Uuid, AccountError> {
    let Some(email) = normalize_email(email) else {
        return Err(AccountError::BadCredentials);
    };

    let row = sqlx::query("SELECT id, password_salt, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Err(AccountError::BadCredentials);
    };

    let salt: String = row.get("password_salt");
    let stored: String = row.get("password_hash");
    if hash_password(password, &salt) != stored {
        return Err(AccountError::BadCredentials);
    }

    Ok(row.get("id"))
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
