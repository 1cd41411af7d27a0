//! Order repository for database operations.
//!
//! Every order read joins the ordered detail and its offer, so the business
//! side and the tier fields come from the live relation rather than copies
//! on the order row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use giglet_core::{OfferDetailId, OfferTier, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::Order;

/// Joined columns selected for every order read.
const ORDER_SELECT: &str = "SELECT po.id, po.customer_id, po.offer_detail_id, po.status,
            po.created_at, po.updated_at,
            o.user_id AS business_user_id,
            d.title, d.revisions, d.delivery_time_in_days, d.price, d.features, d.offer_type
     FROM purchase_order po
     JOIN offer_detail d ON d.id = po.offer_detail_id
     JOIN offer o ON o.id = d.offer_id";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    offer_detail_id: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    business_user_id: i32,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: Decimal,
    features: Json<Vec<String>>,
    offer_type: String,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let offer_type: OfferTier = self.offer_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid offer tier in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            customer_user: UserId::new(self.customer_id),
            business_user: UserId::new(self.business_user_id),
            offer_detail_id: OfferDetailId::new(self.offer_detail_id),
            title: self.title,
            revisions: self.revisions,
            delivery_time_in_days: self.delivery_time_in_days,
            price: self.price,
            features: self.features.0,
            offer_type,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders where the user is the customer or the business side.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_participant(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT}
             WHERE po.customer_id = $1 OR o.user_id = $1
             ORDER BY po.created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// List all orders whose business side is the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_business(
        &self,
        business_user_id: UserId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT}
             WHERE o.user_id = $1
             ORDER BY po.created_at DESC"
        ))
        .bind(business_user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE po.id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Create an order for a customer on one offer detail.
    ///
    /// New orders start `in_progress`; the business side is derived from
    /// the detail's offer, never supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        customer: UserId,
        detail: OfferDetailId,
    ) -> Result<Order, RepositoryError> {
        let (order_id,): (i32,) = sqlx::query_as(
            "INSERT INTO purchase_order (customer_id, offer_detail_id, status)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(customer.as_i32())
        .bind(detail.as_i32())
        .bind(OrderStatus::InProgress)
        .fetch_one(self.pool)
        .await?;

        self.get(OrderId::new(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE purchase_order SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an order.
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM purchase_order WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count a business user's orders in the given status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_business(
        &self,
        business_user_id: UserId,
        status: OrderStatus,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM purchase_order po
             JOIN offer_detail d ON d.id = po.offer_detail_id
             JOIN offer o ON o.id = d.offer_id
             WHERE o.user_id = $1 AND po.status = $2",
        )
        .bind(business_user_id.as_i32())
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
