//! Offer and offer-detail routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giglet_core::{OfferDetailId, OfferId, OfferTier, UserId, types::price};

use crate::db::offers::{
    NewOfferDetail, OfferChanges, OfferDetailPatch, OfferFilter, OfferOrdering, OfferRepository,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{OfferDetail, OfferWithDetails};
use crate::permissions;
use crate::state::AppState;

// ============================================================================
// Wire types
// ============================================================================

/// Offer list query parameters. Unknown `ordering` values fall back to the
/// default sort instead of erroring.
#[derive(Debug, Default, Deserialize)]
pub struct OfferListQuery {
    pub creator_id: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_delivery_time: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl OfferListQuery {
    fn into_filter(self) -> OfferFilter {
        OfferFilter {
            creator_id: self.creator_id.map(UserId::new),
            min_price: self.min_price,
            max_delivery_time: self.max_delivery_time,
            search: self.search.filter(|s| !s.trim().is_empty()),
            ordering: self
                .ordering
                .as_deref()
                .map_or_else(OfferOrdering::default, OfferOrdering::parse),
        }
    }
}

/// A detail reference in offer bodies: id plus a retrieval URL.
#[derive(Debug, Serialize)]
pub struct DetailRef {
    pub id: OfferDetailId,
    pub url: String,
}

impl From<&OfferDetail> for DetailRef {
    fn from(detail: &OfferDetail) -> Self {
        Self {
            id: detail.id,
            url: format!("/offerdetails/{}/", detail.id),
        }
    }
}

/// Full detail body, used by `/offerdetails/{id}/` and write responses.
#[derive(Debug, Serialize)]
pub struct DetailBody {
    pub id: OfferDetailId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[serde(with = "price::two_dp")]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferTier,
}

impl From<OfferDetail> for DetailBody {
    fn from(detail: OfferDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            revisions: detail.revisions,
            delivery_time_in_days: detail.delivery_time_in_days,
            price: detail.price,
            features: detail.features,
            offer_type: detail.offer_type,
        }
    }
}

/// Owner display fields embedded in list items.
#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// Offer body for list responses (details as references, owner embedded).
#[derive(Debug, Serialize)]
pub struct OfferListItem {
    pub id: OfferId,
    pub user: UserId,
    pub title: String,
    pub image: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<DetailRef>,
    #[serde(with = "price::two_dp_opt")]
    pub min_price: Option<Decimal>,
    pub min_delivery_time: Option<i32>,
    pub user_details: UserDetails,
}

impl From<OfferWithDetails> for OfferListItem {
    fn from(item: OfferWithDetails) -> Self {
        Self {
            id: item.offer.id,
            user: item.offer.user_id,
            title: item.offer.title,
            image: item.offer.image,
            description: item.offer.description,
            created_at: item.offer.created_at,
            updated_at: item.offer.updated_at,
            details: item.details.iter().map(DetailRef::from).collect(),
            min_price: item.offer.min_price,
            min_delivery_time: item.offer.min_delivery_time,
            user_details: UserDetails {
                first_name: item.owner_first_name,
                last_name: item.owner_last_name,
                username: item.owner_username,
            },
        }
    }
}

/// Offer body for retrieve responses (details as references, no owner block).
#[derive(Debug, Serialize)]
pub struct OfferRetrieveBody {
    pub id: OfferId,
    pub user: UserId,
    pub title: String,
    pub image: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<DetailRef>,
    #[serde(with = "price::two_dp_opt")]
    pub min_price: Option<Decimal>,
    pub min_delivery_time: Option<i32>,
}

impl From<OfferWithDetails> for OfferRetrieveBody {
    fn from(item: OfferWithDetails) -> Self {
        Self {
            id: item.offer.id,
            user: item.offer.user_id,
            title: item.offer.title,
            image: item.offer.image,
            description: item.offer.description,
            created_at: item.offer.created_at,
            updated_at: item.offer.updated_at,
            details: item.details.iter().map(DetailRef::from).collect(),
            min_price: item.offer.min_price,
            min_delivery_time: item.offer.min_delivery_time,
        }
    }
}

/// Offer body for write responses: full nested details.
#[derive(Debug, Serialize)]
pub struct OfferWriteBody {
    pub id: OfferId,
    pub title: String,
    pub image: String,
    pub description: String,
    pub details: Vec<DetailBody>,
}

impl From<OfferWithDetails> for OfferWriteBody {
    fn from(item: OfferWithDetails) -> Self {
        Self {
            id: item.offer.id,
            title: item.offer.title,
            image: item.offer.image,
            description: item.offer.description,
            details: item.details.into_iter().map(DetailBody::from).collect(),
        }
    }
}

/// Incoming detail payload for offer creation; all fields required.
#[derive(Debug, Deserialize)]
pub struct NewDetailRequest {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[serde(with = "price::two_dp")]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferTier,
}

impl From<NewDetailRequest> for NewOfferDetail {
    fn from(req: NewDetailRequest) -> Self {
        Self {
            title: req.title,
            revisions: req.revisions,
            delivery_time_in_days: req.delivery_time_in_days,
            price: req.price,
            features: req.features,
            offer_type: req.offer_type,
        }
    }
}

/// Offer creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Vec<NewDetailRequest>,
}

/// Incoming detail payload for the nested update flow; everything optional.
#[derive(Debug, Deserialize)]
pub struct DetailPatchRequest {
    pub id: Option<OfferDetailId>,
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    #[serde(default, with = "price::two_dp_opt")]
    pub price: Option<Decimal>,
    pub features: Option<Vec<String>>,
    pub offer_type: Option<OfferTier>,
}

impl From<DetailPatchRequest> for OfferDetailPatch {
    fn from(req: DetailPatchRequest) -> Self {
        Self {
            id: req.id,
            title: req.title,
            revisions: req.revisions,
            delivery_time_in_days: req.delivery_time_in_days,
            price: req.price,
            features: req.features,
            offer_type: req.offer_type,
        }
    }
}

/// Offer update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub details: Option<Vec<DetailPatchRequest>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List offers, with filters.
///
/// GET /offers/
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OfferListQuery>,
) -> Result<Json<Vec<OfferListItem>>> {
    let offers = OfferRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;

    Ok(Json(offers.into_iter().map(OfferListItem::from).collect()))
}

/// Create an offer with its initial detail set.
///
/// POST /offers/
///
/// # Errors
///
/// Returns 403 for non-business callers and 400 when `details` is empty.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferWriteBody>)> {
    if !permissions::can_create_offer(&user) {
        return Err(AppError::Forbidden(
            "Only business accounts may create offers.".to_owned(),
        ));
    }

    if req.title.trim().is_empty() {
        return Err(AppError::field("title", "This field may not be blank."));
    }
    if req.details.is_empty() {
        return Err(AppError::field(
            "details",
            "An offer requires at least one detail.",
        ));
    }

    let details: Vec<NewOfferDetail> = req.details.into_iter().map(Into::into).collect();

    let repo = OfferRepository::new(state.pool());
    let offer_id = repo
        .create(
            user.id,
            &req.title,
            req.image.as_deref().unwrap_or(""),
            req.description.as_deref().unwrap_or(""),
            &details,
        )
        .await?;

    tracing::info!(offer_id = %offer_id, user_id = %user.id, "offer created");

    let offer = repo
        .get(offer_id)
        .await?
        .ok_or_else(|| AppError::Internal("offer vanished after insert".to_owned()))?;

    Ok((StatusCode::CREATED, Json(offer.into())))
}

/// Retrieve a single offer.
///
/// GET /offers/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OfferRetrieveBody>> {
    let offer = OfferRepository::new(state.pool())
        .get(OfferId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    Ok(Json(offer.into()))
}

/// Partially update an offer and reconcile its detail set.
///
/// PATCH /offers/{id}/
///
/// # Errors
///
/// Returns 404 for unknown offers (before the ownership check) and 403 for
/// non-owners.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateOfferRequest>,
) -> Result<Json<OfferWriteBody>> {
    let id = OfferId::new(id);
    let repo = OfferRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    if !permissions::can_modify_offer(&user, existing.offer.user_id) {
        return Err(AppError::Forbidden(
            "You may only edit your own offers.".to_owned(),
        ));
    }

    let changes = OfferChanges {
        title: req.title,
        image: req.image,
        description: req.description,
    };
    let patches: Option<Vec<OfferDetailPatch>> = req
        .details
        .map(|details| details.into_iter().map(Into::into).collect());

    repo.update_with_details(id, &changes, patches.as_deref())
        .await?;

    let offer = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    Ok(Json(offer.into()))
}

/// Delete an offer; its details cascade.
///
/// DELETE /offers/{id}/
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = OfferId::new(id);
    let repo = OfferRepository::new(state.pool());

    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    if !permissions::can_modify_offer(&user, existing.offer.user_id) {
        return Err(AppError::Forbidden(
            "You may only delete your own offers.".to_owned(),
        ));
    }

    repo.delete(id).await?;

    tracing::info!(offer_id = %id, user_id = %user.id, "offer deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Retrieve a single offer detail.
///
/// GET /offerdetails/{id}/
pub async fn retrieve_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DetailBody>> {
    let detail = OfferRepository::new(state.pool())
        .get_detail(OfferDetailId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer detail {id}")))?;

    Ok(Json(detail.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_ref_url_shape() {
        let detail = OfferDetail {
            id: OfferDetailId::new(7),
            offer_id: OfferId::new(1),
            title: "Basic".to_string(),
            revisions: 2,
            delivery_time_in_days: 5,
            price: Decimal::new(15_000, 2),
            features: vec![],
            offer_type: OfferTier::Basic,
        };
        let reference = DetailRef::from(&detail);
        assert_eq!(reference.url, "/offerdetails/7/");
    }

    #[test]
    fn test_list_query_ordering_fallback() {
        let query = OfferListQuery {
            ordering: Some("; DROP TABLE offer".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().ordering, OfferOrdering::CreatedAtDesc);
    }

    #[test]
    fn test_list_query_blank_search_dropped() {
        let query = OfferListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(query.into_filter().search.is_none());
    }

    #[test]
    fn test_detail_body_serializes_fixed_point_price() {
        let body = DetailBody {
            id: OfferDetailId::new(1),
            title: "Standard".to_string(),
            revisions: 5,
            delivery_time_in_days: 7,
            price: Decimal::new(500, 0),
            features: vec!["Logo".to_string()],
            offer_type: OfferTier::Standard,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["price"], "500.00");
        assert_eq!(json["offer_type"], "standard");
    }
}
