//! Profile repository for database operations.
//!
//! Profiles are a 1:1 shadow of `user_account`; every read joins the user
//! row so display fields (username, names, email, role) come out flat.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use giglet_core::{Role, UserId};

use super::RepositoryError;
use crate::models::Profile;

/// Joined profile + user columns selected for every profile read.
const PROFILE_COLUMNS: &str = "p.user_id, u.username, u.first_name, u.last_name, u.email, \
     u.role, p.file, p.location, p.tel, p.description, p.working_hours, p.created_at";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i32,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    file: String,
    location: String,
    tel: String,
    description: String,
    working_hours: String,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_domain(self) -> Result<Profile, RepositoryError> {
        let role: Role = self.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Profile {
            user_id: UserId::new(self.user_id),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role,
            file: self.file,
            location: self.location,
            tel: self.tel,
            description: self.description,
            working_hours: self.working_hours,
            created_at: self.created_at,
        })
    }
}

/// Partial changes to a profile and its user row.
///
/// `None` fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub file: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profile p
             JOIN user_account u ON u.id = p.user_id
             WHERE p.user_id = $1"
        ))
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_domain).transpose()
    }

    /// List all profiles with the given role, newest account first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profile p
             JOIN user_account u ON u.id = p.user_id
             WHERE u.role = $1
             ORDER BY p.user_id ASC"
        ))
        .bind(role)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProfileRow::into_domain).collect()
    }

    /// Apply a partial update to a profile and its user row, atomically.
    ///
    /// Name and email changes land on `user_account`, the rest on `profile`;
    /// both updates share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE user_account
             SET first_name = COALESCE($2, first_name),
                 last_name  = COALESCE($3, last_name),
                 email      = COALESCE($4, email),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id.as_i32())
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "UPDATE profile
             SET file          = COALESCE($2, file),
                 location      = COALESCE($3, location),
                 tel           = COALESCE($4, tel),
                 description   = COALESCE($5, description),
                 working_hours = COALESCE($6, working_hours)
             WHERE user_id = $1",
        )
        .bind(user_id.as_i32())
        .bind(changes.file)
        .bind(changes.location)
        .bind(changes.tel)
        .bind(changes.description)
        .bind(changes.working_hours)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profile p
             JOIN user_account u ON u.id = p.user_id
             WHERE p.user_id = $1"
        ))
        .bind(user_id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_domain()
    }
}
