//! Review routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giglet_core::{ReviewId, UserId};

use crate::db::reviews::{ReviewFilter, ReviewOrdering, ReviewRepository};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Review;
use crate::permissions;
use crate::state::AppState;

/// Review response body.
#[derive(Debug, Serialize)]
pub struct ReviewBody {
    pub id: ReviewId,
    pub business_user: UserId,
    pub reviewer: UserId,
    pub rating: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewBody {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            business_user: review.business_user,
            reviewer: review.reviewer,
            rating: review.rating,
            description: review.description,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Review list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub business_user_id: Option<i32>,
    pub reviewer_id: Option<i32>,
    pub ordering: Option<String>,
}

impl ReviewListQuery {
    fn into_filter(self) -> ReviewFilter {
        ReviewFilter {
            business_user_id: self.business_user_id.map(UserId::new),
            reviewer_id: self.reviewer_id.map(UserId::new),
            ordering: self
                .ordering
                .as_deref()
                .map_or_else(ReviewOrdering::default, ReviewOrdering::parse),
        }
    }
}

/// Review creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub business_user: i32,
    pub rating: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Review update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub description: Option<String>,
}

/// Rating bounds are checked before anything touches the database.
fn validate_rating(rating: i32) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::field("rating", "Rating must be between 1 and 5."))
    }
}

/// List reviews, with filters.
///
/// GET /reviews/
pub async fn list(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<ReviewBody>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;

    Ok(Json(reviews.into_iter().map(ReviewBody::from).collect()))
}

/// Write a review of a business user.
///
/// POST /reviews/
///
/// # Errors
///
/// Returns 403 for non-customer callers or non-business targets, and 400
/// for out-of-range ratings and duplicate (reviewer, target) pairs.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewBody>)> {
    validate_rating(req.rating)?;

    let target = UserRepository::new(state.pool())
        .get_by_id(UserId::new(req.business_user))
        .await?
        .ok_or_else(|| AppError::field("business_user", "Unknown user."))?;

    if !permissions::can_create_review(&user, &target) {
        return Err(AppError::Forbidden(
            "Only customer accounts may review business accounts.".to_owned(),
        ));
    }

    let review = ReviewRepository::new(state.pool())
        .create(
            user.id,
            target.id,
            req.rating,
            req.description.as_deref().unwrap_or(""),
        )
        .await?;

    tracing::info!(review_id = %review.id, reviewer = %user.id, "review created");

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// Partially update a review.
///
/// PATCH /reviews/{id}/
///
/// # Errors
///
/// Returns 404 for unknown reviews and 403 unless the caller wrote it.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewBody>> {
    if let Some(rating) = req.rating {
        validate_rating(rating)?;
    }

    let id = ReviewId::new(id);
    let repo = ReviewRepository::new(state.pool());

    let review = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;

    if !permissions::can_modify_review(&user, &review) {
        return Err(AppError::Forbidden(
            "You may only edit your own reviews.".to_owned(),
        ));
    }

    let review = repo
        .update(id, req.rating, req.description.as_deref())
        .await?;

    Ok(Json(review.into()))
}

/// Delete a review.
///
/// DELETE /reviews/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = ReviewId::new(id);
    let repo = ReviewRepository::new(state.pool());

    let review = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;

    if !permissions::can_modify_review(&user, &review) {
        return Err(AppError::Forbidden(
            "You may only delete your own reviews.".to_owned(),
        ));
    }

    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::validate_rating;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }
}
