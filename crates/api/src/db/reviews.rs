//! Review repository for database operations.
//!
//! The (reviewer, business) uniqueness lives in the database; duplicate
//! inserts come back as `Conflict`, never as a second row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use giglet_core::{ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_COLUMNS: &str =
    "id, business_user_id, reviewer_id, rating, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    business_user_id: i32,
    reviewer_id: i32,
    rating: i32,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(r.id),
            business_user: UserId::new(r.business_user_id),
            reviewer: UserId::new(r.reviewer_id),
            rating: r.rating,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Review list filters taken from query parameters.
#[derive(Debug, Default, Clone)]
pub struct ReviewFilter {
    /// Only reviews targeting this business user.
    pub business_user_id: Option<UserId>,
    /// Only reviews written by this user.
    pub reviewer_id: Option<UserId>,
    /// Sort key; see [`ReviewOrdering`].
    pub ordering: ReviewOrdering,
}

/// Whitelisted sort orders for the review list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOrdering {
    /// Newest first (default).
    #[default]
    UpdatedAtDesc,
    UpdatedAtAsc,
    RatingDesc,
    RatingAsc,
}

impl ReviewOrdering {
    /// Parse the `ordering` query parameter; unknown values fall back to
    /// the default order.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "updated_at" => Self::UpdatedAtAsc,
            "rating" => Self::RatingAsc,
            "-rating" => Self::RatingDesc,
            _ => Self::UpdatedAtDesc,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::UpdatedAtDesc => "updated_at DESC",
            Self::UpdatedAtAsc => "updated_at ASC",
            Self::RatingDesc => "rating DESC",
            Self::RatingAsc => "rating ASC",
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews, applying the given filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ReviewFilter) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS}
             FROM review
             WHERE ($1::int IS NULL OR business_user_id = $1)
               AND ($2::int IS NULL OR reviewer_id = $2)
             ORDER BY {}",
            filter.ordering.sql()
        ))
        .bind(filter.business_user_id.map(|id| id.as_i32()))
        .bind(filter.reviewer_id.map(|id| id.as_i32()))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Get a single review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the reviewer has already
    /// reviewed this business user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        reviewer: UserId,
        business_user: UserId,
        rating: i32,
        description: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO review (business_user_id, reviewer_id, rating, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(business_user.as_i32())
        .bind(reviewer.as_i32())
        .bind(rating)
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_unique_violation(e, "you have already reviewed this user")
        })?;

        Ok(row.into())
    }

    /// Apply a partial update to a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Option<i32>,
        description: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE review
             SET rating      = COALESCE($2, rating),
                 description = COALESCE($3, description),
                 updated_at  = NOW()
             WHERE id = $1
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(rating)
        .bind(description)
        .fetch_optional(self.pool)
        .await?;

        row.map(Review::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a review.
    ///
    /// Returns `true` if the review was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
