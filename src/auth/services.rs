use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::RegisterRequest,
    password::{hash_password, verify_password},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("email regex compiles");
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `local@domain.tld`, ASCII only; expects an already normalized address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validates in order: password length, email shape, email availability.
pub async fn register_user(users: &dyn UserRepo, req: RegisterRequest) -> AppResult<User> {
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".into(),
        ));
    }

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("Invalid email format".into()));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = hash_password(&req.password).await?;
    let user = users
        .create(NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email,
            password_hash,
            phone: req.phone,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Looks the user up by email and checks the password against its hash.
pub async fn authenticate(users: &dyn UserRepo, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email);
    let Some(user) = users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::NotFound("Email not found".into()));
    };

    if !verify_password(password, &user.password_hash).await? {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::Auth("Incorrect password".into()));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            phone: "555-0100".into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.COM \n"), "ada@example.com");
    }

    #[tokio::test]
    async fn password_length_boundary() {
        let store = MemoryStore::new();
        let err = register_user(&store, request("a@example.com", "1234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let user = register_user(&store, request("a@example.com", "12345678"))
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_ne!(user.password_hash, "12345678");
    }

    #[tokio::test]
    async fn password_checked_before_email() {
        let store = MemoryStore::new();
        let err = register_user(&store, request("nope", "short")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("8 characters")));
    }

    #[tokio::test]
    async fn duplicate_email_after_trim_conflicts() {
        let store = MemoryStore::new();
        register_user(&store, request("dup@example.com", "password1"))
            .await
            .unwrap();
        let err = register_user(&store, request("  dup@example.com ", "password2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Email already exists"));
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let store = MemoryStore::new();
        let user = register_user(&store, request("log@example.com", "password1"))
            .await
            .unwrap();

        let ok = authenticate(&store, "log@example.com", "password1").await.unwrap();
        assert_eq!(ok.id, user.id);

        let wrong = authenticate(&store, "log@example.com", "password2").await.unwrap_err();
        assert!(matches!(wrong, AppError::Auth(_)));

        let unknown = authenticate(&store, "who@example.com", "password1").await.unwrap_err();
        assert!(matches!(unknown, AppError::NotFound(_)));
    }
}
