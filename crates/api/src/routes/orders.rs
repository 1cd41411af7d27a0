//! Order routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use giglet_core::{OfferDetailId, OfferTier, OrderId, OrderStatus, UserId, types::price};

use crate::db::offers::OfferRepository;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::permissions;
use crate::state::AppState;

/// Order response body. Tier fields are read through the relation.
#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub id: OrderId,
    pub customer_user: UserId,
    pub business_user: UserId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[serde(with = "price::two_dp")]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferTier,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_user: order.customer_user,
            business_user: order.business_user,
            title: order.title,
            revisions: order.revisions,
            delivery_time_in_days: order.delivery_time_in_days,
            price: order.price,
            features: order.features,
            offer_type: order.offer_type,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Order creation request: the ordered detail is the only client input.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub offer_detail_id: i32,
}

/// Order status update request. The status arrives as a raw string so an
/// unknown value becomes a field error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
}

/// List the caller's orders (either side).
///
/// GET /orders/
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderBody>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_participant(user.id)
        .await?;

    Ok(Json(orders.into_iter().map(OrderBody::from).collect()))
}

/// Place an order for one offer detail.
///
/// POST /orders/
///
/// The customer side is the caller; the business side is derived from the
/// detail's offer.
///
/// # Errors
///
/// Returns 403 for business callers and 400 for unknown detail ids.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderBody>)> {
    if !permissions::can_create_order(&user) {
        return Err(AppError::Forbidden(
            "Only customer accounts may place orders.".to_owned(),
        ));
    }

    let detail_id = OfferDetailId::new(req.offer_detail_id);

    // An unknown detail is a payload problem, not a missing route resource
    let owner = OfferRepository::new(state.pool())
        .get_detail_owner(detail_id)
        .await?
        .ok_or_else(|| AppError::field("offer_detail_id", "Unknown offer detail."))?;

    if owner == user.id {
        return Err(AppError::field(
            "offer_detail_id",
            "You cannot order your own offer.",
        ));
    }

    let order = OrderRepository::new(state.pool())
        .create(user.id, detail_id)
        .await?;

    tracing::info!(order_id = %order.id, customer = %user.id, "order placed");

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Update an order's status.
///
/// PATCH /orders/{id}/
///
/// # Errors
///
/// Returns 404 for unknown orders, 403 unless the caller is the business
/// side, and 400 for unknown status values.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderBody>> {
    let id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !permissions::can_update_order_status(&user, &order) {
        return Err(AppError::Forbidden(
            "Only the business side may update the order status.".to_owned(),
        ));
    }

    let status: OrderStatus = req
        .status
        .parse()
        .map_err(|_| AppError::field("status", "Unknown status value."))?;

    repo.update_status(id, status).await?;

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(order.into()))
}

/// Delete an order.
///
/// DELETE /orders/{id}/
///
/// Staff accounts only; neither participant qualifies.
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    repo.get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !permissions::can_delete_order(&user) {
        return Err(AppError::Forbidden(
            "Only staff accounts may delete orders.".to_owned(),
        ));
    }

    repo.delete(id).await?;

    tracing::info!(order_id = %id, staff = %user.id, "order deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// List all orders on a business user's offers.
///
/// GET /orders/business/{business_user_id}/
///
/// Unknown ids yield an empty list, not a 404.
pub async fn list_for_business(
    State(state): State<AppState>,
    Path(business_user_id): Path<i32>,
) -> Result<Json<Vec<OrderBody>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_business(UserId::new(business_user_id))
        .await?;

    Ok(Json(orders.into_iter().map(OrderBody::from).collect()))
}

#[derive(Debug, Serialize)]
pub struct OrderCountResponse {
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CompletedOrderCountResponse {
    pub completed_order_count: i64,
}

/// Resolve the path id to a business account or 404.
async fn require_business(state: &AppState, id: i32) -> Result<UserId> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .filter(crate::models::User::is_business)
        .ok_or_else(|| AppError::NotFound(format!("business user {id}")))?;

    Ok(user.id)
}

/// Count a business user's in-progress orders.
///
/// GET /order-count/{business_user_id}/
///
/// # Errors
///
/// Returns 404 for unknown ids or non-business accounts.
pub async fn in_progress_count(
    State(state): State<AppState>,
    Path(business_user_id): Path<i32>,
) -> Result<Json<OrderCountResponse>> {
    let business = require_business(&state, business_user_id).await?;

    let order_count = OrderRepository::new(state.pool())
        .count_for_business(business, OrderStatus::InProgress)
        .await?;

    Ok(Json(OrderCountResponse { order_count }))
}

/// Count a business user's completed orders.
///
/// GET /completed-order-count/{business_user_id}/
///
/// # Errors
///
/// Returns 404 for unknown ids or non-business accounts.
pub async fn completed_count(
    State(state): State<AppState>,
    Path(business_user_id): Path<i32>,
) -> Result<Json<CompletedOrderCountResponse>> {
    let business = require_business(&state, business_user_id).await?;

    let completed_order_count = OrderRepository::new(state.pool())
        .count_for_business(business, OrderStatus::Completed)
        .await?;

    Ok(Json(CompletedOrderCountResponse {
        completed_order_count,
    }))
}
