//! Platform statistics route.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::stats::StatsRepository;
use crate::error::Result;
use crate::state::AppState;

/// Platform aggregate snapshot.
#[derive(Debug, Serialize)]
pub struct BaseInfoResponse {
    pub review_count: i64,
    /// One-decimal mean rating; null while the platform has no reviews.
    pub average_rating: Option<f64>,
    pub business_profile_count: i64,
    pub offer_count: i64,
}

/// Platform-wide counts and average rating, recomputed per request.
///
/// GET /base-info/
pub async fn base_info(State(state): State<AppState>) -> Result<Json<BaseInfoResponse>> {
    let stats = StatsRepository::new(state.pool()).platform().await?;

    Ok(Json(BaseInfoResponse {
        review_count: stats.review_count,
        average_rating: stats.average_rating,
        business_profile_count: stats.business_profile_count,
        offer_count: stats.offer_count,
    }))
}
