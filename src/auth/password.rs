//! Argon2 password hashing. Hashing and verification are CPU-bound, so both
//! run on tokio's blocking pool instead of a runtime worker.

use anyhow::Context;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .context("password hashing task failed")?
}

/// Constant-time comparison is done by argon2's verifier.
pub async fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let (plain, hash) = (plain.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &hash))
        .await
        .context("password verification task failed")?
}

fn hash_blocking(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!("argon2 hash failed: {e}")
        })?;
    Ok(hash.to_string())
}

fn verify_blocking(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("malformed password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("Secur3P@ssw0rd!").await.expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secur3P@ssw0rd!", &hash).await.expect("verify"));
        assert!(!verify_password("wrong-password", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let a = hash_password("password123").await.unwrap();
        let b = hash_password("password123").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-valid-hash").await.is_err());
    }
}
