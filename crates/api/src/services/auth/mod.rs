//! Authentication service.
//!
//! Registration, token login and password handling. Tokens are opaque
//! random strings stored server-side, one per account.

mod error;

pub use error::AuthServiceError;

use std::collections::BTreeMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sqlx::PgPool;

use giglet_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes per generated token (40 characters once encoded).
const TOKEN_BYTES: usize = 30;

/// A successful registration or login.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Handles account registration and token login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account and issue its token.
    ///
    /// The account type arrives as a raw string so an unknown value becomes
    /// a field error rather than a deserialization failure.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Validation` with per-field messages if the
    /// payload is invalid or the username/email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        repeated_password: &str,
        account_type: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let username = username.trim();
        if username.is_empty() {
            add_error(&mut errors, "username", "This field may not be blank.");
        }

        let email = match Email::parse(email) {
            Ok(email) => Some(email),
            Err(e) => {
                add_error(&mut errors, "email", &e.to_string());
                None
            }
        };

        if password.len() < MIN_PASSWORD_LENGTH {
            add_error(
                &mut errors,
                "password",
                &format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if password != repeated_password {
            add_error(&mut errors, "repeated_password", "Passwords do not match.");
        }

        let role = match account_type.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                add_error(&mut errors, "type", "Must be 'customer' or 'business'.");
                None
            }
        };

        if !errors.is_empty() {
            return Err(AuthServiceError::Validation(errors));
        }

        // Both are Some once validation passed
        let (Some(email), Some(role)) = (email, role) else {
            return Err(AuthServiceError::field("non_field_errors", "Invalid registration data."));
        };

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_profile(username, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => conflict_to_field_error(&msg),
                other => AuthServiceError::Repository(other),
            })?;

        let token = self
            .users
            .get_or_create_token(user.id, &generate_token())
            .await?;

        Ok(AuthenticatedUser { user, token })
    }

    /// Log in with username and password, returning the account token.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::InvalidCredentials` for an unknown username
    /// or a wrong password; the two cases are indistinguishable to the caller.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self
            .users
            .get_or_create_token(user.id, &generate_token())
            .await?;

        Ok(AuthenticatedUser { user, token })
    }
}

fn add_error(errors: &mut BTreeMap<String, Vec<String>>, field: &str, message: &str) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.to_owned());
}

/// Route a uniqueness conflict to the field it names.
fn conflict_to_field_error(msg: &str) -> AuthServiceError {
    let field = if msg.contains("email") {
        "email"
    } else {
        "username"
    };
    AuthServiceError::field(field, &format!("A user with that {field} already exists."))
}

/// Generate a fresh opaque API token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthServiceError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthServiceError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| AuthServiceError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthServiceError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password!", &hash),
            Err(AuthServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_conflict_routing_picks_field() {
        let err = conflict_to_field_error("email already exists");
        let AuthServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("email"));

        let err = conflict_to_field_error("username already exists");
        let AuthServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("username"));
    }
}
