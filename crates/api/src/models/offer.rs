//! Offer domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use giglet_core::{OfferDetailId, OfferId, OfferTier, UserId};

/// A business user's sellable package.
///
/// `min_price` and `min_delivery_time` are derived from the live detail set
/// at query time; they are `None` when the offer has no details.
#[derive(Debug, Clone)]
pub struct Offer {
    /// Unique offer ID.
    pub id: OfferId,
    /// Business account that owns this offer.
    pub user_id: UserId,
    /// Offer title.
    pub title: String,
    /// Optional image path; empty string when unset.
    pub image: String,
    /// Free-text description; empty string when unset.
    pub description: String,
    /// Minimum detail price, absent when the offer has no details.
    pub min_price: Option<Decimal>,
    /// Minimum detail delivery time in days, absent when the offer has no details.
    pub min_delivery_time: Option<i32>,
    /// When the offer was created.
    pub created_at: DateTime<Utc>,
    /// When the offer was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One priced tier of an offer.
#[derive(Debug, Clone)]
pub struct OfferDetail {
    /// Unique detail ID.
    pub id: OfferDetailId,
    /// Parent offer (cascade-deleted with it).
    pub offer_id: OfferId,
    /// Tier title.
    pub title: String,
    /// Number of revisions included.
    pub revisions: i32,
    /// Delivery time in days.
    pub delivery_time_in_days: i32,
    /// Tier price, two fraction digits.
    pub price: Decimal,
    /// Included features.
    pub features: Vec<String>,
    /// Tier discriminant, unique per offer.
    pub offer_type: OfferTier,
}

/// An offer together with its detail set.
#[derive(Debug, Clone)]
pub struct OfferWithDetails {
    pub offer: Offer,
    pub details: Vec<OfferDetail>,
    /// Owner display fields for list representations.
    pub owner_username: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
}
