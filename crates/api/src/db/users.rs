//! User repository for database operations.
//!
//! Provides database access for accounts and their API tokens. Queries use
//! the sqlx runtime API with explicit row structs mapped into domain types.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use giglet_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Columns selected for every user row.
const USER_COLUMNS: &str =
    "id, username, email, role, first_name, last_name, is_staff, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    role: String,
    first_name: String,
    last_name: String,
    is_staff: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = self.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            username: self.username,
            email,
            role,
            first_name: self.first_name,
            last_name: self.last_name,
            is_staff: self.is_staff,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM user_account WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM user_account WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Create a new account together with its empty profile, atomically.
    ///
    /// The profile row is an explicit step inside the same transaction, so
    /// an account can never exist without one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the duplicate field if the
    /// username or email is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_profile(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO user_account (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("email") => "email",
                    _ => "username",
                };
                return RepositoryError::Conflict(format!("{field} already exists"));
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query("INSERT INTO profile (user_id) VALUES ($1)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_domain()
    }

    /// Get a user's password hash by username.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, HashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM user_account WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_domain()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get or create the API token for a user.
    ///
    /// Each account has exactly one opaque token; repeated logins return the
    /// same key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate: &str,
    ) -> Result<String, RepositoryError> {
        let (token,): (String,) = sqlx::query_as(
            "INSERT INTO auth_token (token, user_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET token = auth_token.token
             RETURNING token",
        )
        .bind(candidate)
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(token)
    }

    /// Resolve an API token to its account.
    ///
    /// Returns `None` for unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.email, u.role, u.first_name, u.last_name,
                    u.is_staff, u.created_at, u.updated_at
             FROM user_account u
             JOIN auth_token t ON t.user_id = u.id
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }
}
