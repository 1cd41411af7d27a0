//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use giglet_core::{OfferDetailId, OfferTier, OrderId, OrderStatus, UserId};

/// A customer's purchase of one offer detail.
///
/// Title, price and the remaining tier fields are captured through the
/// relation at read time, not copied onto the row. The business side is
/// derived via offer detail → offer → owner and never stored.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_user: UserId,
    /// Business owner of the ordered detail (derived).
    pub business_user: UserId,
    /// The ordered detail.
    pub offer_detail_id: OfferDetailId,
    /// Tier title at read time.
    pub title: String,
    /// Revisions included in the ordered tier.
    pub revisions: i32,
    /// Delivery time in days of the ordered tier.
    pub delivery_time_in_days: i32,
    /// Price of the ordered tier.
    pub price: Decimal,
    /// Features of the ordered tier.
    pub features: Vec<String>,
    /// Tier discriminant of the ordered detail.
    pub offer_type: OfferTier,
    /// Order lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
