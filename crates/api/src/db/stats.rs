//! Platform statistics.
//!
//! Aggregates are recomputed from current rows on every call; nothing is
//! cached or stored.

use sqlx::PgPool;

use giglet_core::Role;

use super::RepositoryError;

/// Point-in-time platform aggregate for `/base-info/`.
#[derive(Debug, Clone, Copy)]
pub struct PlatformStats {
    pub review_count: i64,
    /// Mean review rating, rounded to one decimal; absent with no reviews.
    pub average_rating: Option<f64>,
    pub business_profile_count: i64,
    pub offer_count: i64,
}

/// Round a mean rating to one decimal place.
pub(crate) fn round_rating(raw: f64) -> f64 {
    (raw * 10.0).round() / 10.0
}

/// Repository for platform-level aggregates.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Compute the platform aggregate snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn platform(&self) -> Result<PlatformStats, RepositoryError> {
        let (review_count, average_rating, business_profile_count, offer_count): (
            i64,
            Option<f64>,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM review),
                    (SELECT AVG(rating)::float8 FROM review),
                    (SELECT COUNT(*) FROM user_account WHERE role = $1),
                    (SELECT COUNT(*) FROM offer)",
        )
        .bind(Role::Business)
        .fetch_one(self.pool)
        .await?;

        Ok(PlatformStats {
            review_count,
            average_rating: average_rating.map(round_rating),
            business_profile_count,
            offer_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::round_rating;

    #[test]
    fn test_rounds_to_one_decimal() {
        // Ratings [5, 4, 4] -> mean 4.333... -> 4.3
        assert!((round_rating(13.0 / 3.0) - 4.3).abs() < f64::EPSILON);
        assert!((round_rating(4.35) - 4.4).abs() < f64::EPSILON);
        assert!((round_rating(5.0) - 5.0).abs() < f64::EPSILON);
    }
}
