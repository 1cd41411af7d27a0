//! Authentication error types.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Registration payload failed validation; field name -> messages.
    #[error("registration validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    Hash(String),
}

impl AuthServiceError {
    /// Validation error for a single field.
    pub(crate) fn field(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_owned(), vec![message.to_owned()]);
        Self::Validation(errors)
    }
}
