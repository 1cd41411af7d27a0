//! Review domain types.

use chrono::{DateTime, Utc};

use giglet_core::{ReviewId, UserId};

/// A customer's 1-5 rating of a business user.
///
/// Unique per (reviewer, business) pair; the database constraint is the
/// source of truth and violations surface as conflicts.
#[derive(Debug, Clone)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Reviewed business account.
    pub business_user: UserId,
    /// Customer who wrote the review.
    pub reviewer: UserId,
    /// Rating in [1, 5].
    pub rating: i32,
    /// Optional free-text comment; empty string when unset.
    pub description: String,
    /// When the review was written.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
}
