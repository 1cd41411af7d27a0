//! Offer repository for database operations.
//!
//! Derived aggregates (`min_price`, `min_delivery_time`) are computed in the
//! query from the live detail set, never stored. The nested detail update
//! runs as one transaction so a failed child upsert rolls back the parent
//! merge too.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use giglet_core::{OfferDetailId, OfferId, OfferTier, UserId};

use super::RepositoryError;
use crate::models::{Offer, OfferDetail, OfferWithDetails};

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: i32,
    user_id: i32,
    title: String,
    image: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
    first_name: String,
    last_name: String,
    min_price: Option<Decimal>,
    min_delivery_time: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    id: i32,
    offer_id: i32,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: Decimal,
    features: Json<Vec<String>>,
    offer_type: String,
}

impl DetailRow {
    fn into_domain(self) -> Result<OfferDetail, RepositoryError> {
        let offer_type: OfferTier = self.offer_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid offer tier in database: {e}"))
        })?;

        Ok(OfferDetail {
            id: OfferDetailId::new(self.id),
            offer_id: OfferId::new(self.offer_id),
            title: self.title,
            revisions: self.revisions,
            delivery_time_in_days: self.delivery_time_in_days,
            price: self.price,
            features: self.features.0,
            offer_type,
        })
    }
}

fn assemble(row: OfferRow, details: Vec<OfferDetail>) -> OfferWithDetails {
    OfferWithDetails {
        offer: Offer {
            id: OfferId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            image: row.image,
            description: row.description,
            min_price: row.min_price,
            min_delivery_time: row.min_delivery_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        details,
        owner_username: row.username,
        owner_first_name: row.first_name,
        owner_last_name: row.last_name,
    }
}

/// Offer list filters taken from query parameters.
#[derive(Debug, Default, Clone)]
pub struct OfferFilter {
    /// Only offers owned by this user.
    pub creator_id: Option<UserId>,
    /// Only offers whose cheapest tier costs at least this much.
    pub min_price: Option<Decimal>,
    /// Only offers deliverable within this many days.
    pub max_delivery_time: Option<i32>,
    /// Substring match on title or description.
    pub search: Option<String>,
    /// Sort key; see [`OfferOrdering`].
    pub ordering: OfferOrdering,
}

/// Whitelisted sort orders for the offer list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OfferOrdering {
    /// Newest first (default).
    #[default]
    CreatedAtDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
    MinPriceAsc,
    MinPriceDesc,
}

impl OfferOrdering {
    /// Parse the `ordering` query parameter; unknown values fall back to
    /// the default order rather than erroring.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "updated_at" => Self::UpdatedAtAsc,
            "-updated_at" => Self::UpdatedAtDesc,
            "min_price" => Self::MinPriceAsc,
            "-min_price" => Self::MinPriceDesc,
            _ => Self::CreatedAtDesc,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::CreatedAtDesc => "o.created_at DESC",
            Self::UpdatedAtAsc => "o.updated_at ASC",
            Self::UpdatedAtDesc => "o.updated_at DESC",
            Self::MinPriceAsc => "agg.min_price ASC NULLS LAST",
            Self::MinPriceDesc => "agg.min_price DESC NULLS LAST",
        }
    }
}

/// A new offer detail supplied at creation time.
#[derive(Debug, Clone)]
pub struct NewOfferDetail {
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferTier,
}

/// A partial detail payload for the nested update flow.
///
/// Matched against existing children by `id` first, then by `offer_type`;
/// an unmatched payload inserts a new child.
#[derive(Debug, Default, Clone)]
pub struct OfferDetailPatch {
    pub id: Option<OfferDetailId>,
    pub title: Option<String>,
    pub revisions: Option<i32>,
    pub delivery_time_in_days: Option<i32>,
    pub price: Option<Decimal>,
    pub features: Option<Vec<String>>,
    pub offer_type: Option<OfferTier>,
}

/// Partial changes to an offer's own scalar fields.
#[derive(Debug, Default, Clone)]
pub struct OfferChanges {
    pub title: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Repository for offer database operations.
pub struct OfferRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OfferRepository<'a> {
    /// Create a new offer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List offers with derived aggregates, applying the given filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &OfferFilter) -> Result<Vec<OfferWithDetails>, RepositoryError> {
        let query = format!(
            "SELECT o.id, o.user_id, o.title, o.image, o.description,
                    o.created_at, o.updated_at,
                    u.username, u.first_name, u.last_name,
                    agg.min_price, agg.min_delivery_time
             FROM offer o
             JOIN user_account u ON u.id = o.user_id
             LEFT JOIN LATERAL (
                 SELECT MIN(d.price) AS min_price,
                        MIN(d.delivery_time_in_days) AS min_delivery_time
                 FROM offer_detail d
                 WHERE d.offer_id = o.id
             ) agg ON TRUE
             WHERE ($1::int IS NULL OR o.user_id = $1)
               AND ($2::numeric IS NULL OR agg.min_price >= $2)
               AND ($3::int IS NULL OR agg.min_delivery_time <= $3)
               AND ($4::text IS NULL
                    OR o.title ILIKE '%' || $4 || '%'
                    OR o.description ILIKE '%' || $4 || '%')
             ORDER BY {}",
            filter.ordering.sql()
        );

        let rows = sqlx::query_as::<_, OfferRow>(&query)
            .bind(filter.creator_id.map(|id| id.as_i32()))
            .bind(filter.min_price)
            .bind(filter.max_delivery_time)
            .bind(filter.search.as_deref())
            .fetch_all(self.pool)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let detail_rows = sqlx::query_as::<_, DetailRow>(
            "SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                    features, offer_type
             FROM offer_detail
             WHERE offer_id = ANY($1)
             ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut details_by_offer: std::collections::HashMap<i32, Vec<OfferDetail>> =
            std::collections::HashMap::new();
        for d in detail_rows {
            let offer_id = d.offer_id;
            details_by_offer
                .entry(offer_id)
                .or_default()
                .push(d.into_domain()?);
        }

        Ok(rows
            .into_iter()
            .map(|r| {
                let details = details_by_offer.remove(&r.id).unwrap_or_default();
                assemble(r, details)
            })
            .collect())
    }

    /// Get a single offer with details and derived aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OfferId) -> Result<Option<OfferWithDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, OfferRow>(
            "SELECT o.id, o.user_id, o.title, o.image, o.description,
                    o.created_at, o.updated_at,
                    u.username, u.first_name, u.last_name,
                    agg.min_price, agg.min_delivery_time
             FROM offer o
             JOIN user_account u ON u.id = o.user_id
             LEFT JOIN LATERAL (
                 SELECT MIN(d.price) AS min_price,
                        MIN(d.delivery_time_in_days) AS min_delivery_time
                 FROM offer_detail d
                 WHERE d.offer_id = o.id
             ) agg ON TRUE
             WHERE o.id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let detail_rows = sqlx::query_as::<_, DetailRow>(
            "SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                    features, offer_type
             FROM offer_detail
             WHERE offer_id = $1
             ORDER BY id ASC",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let details = detail_rows
            .into_iter()
            .map(DetailRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(assemble(row, details)))
    }

    /// Create an offer with its initial detail set, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if two details share a tier.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        title: &str,
        image: &str,
        description: &str,
        details: &[NewOfferDetail],
    ) -> Result<OfferId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (offer_id,): (i32,) = sqlx::query_as(
            "INSERT INTO offer (user_id, title, image, description)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(owner.as_i32())
        .bind(title)
        .bind(image)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        for detail in details {
            insert_detail(&mut tx, offer_id, detail).await?;
        }

        tx.commit().await?;

        Ok(OfferId::new(offer_id))
    }

    /// Merge parent scalar changes and reconcile the child detail set, as
    /// one transaction.
    ///
    /// Each detail payload is matched against the existing children by
    /// explicit `id` first, then by tier; matches get a partial field merge,
    /// everything else inserts a new child. Existing children not referenced
    /// by the payload are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the offer doesn't exist.
    /// Returns `RepositoryError::Conflict` if an inserted payload is missing
    /// required fields or duplicates a tier.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_with_details(
        &self,
        id: OfferId,
        changes: &OfferChanges,
        details: Option<&[OfferDetailPatch]>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE offer
             SET title       = COALESCE($2, title),
                 image       = COALESCE($3, image),
                 description = COALESCE($4, description),
                 updated_at  = NOW()
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(changes.title.as_deref())
        .bind(changes.image.as_deref())
        .bind(changes.description.as_deref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(patches) = details {
            let existing = sqlx::query_as::<_, (i32, String)>(
                "SELECT id, offer_type FROM offer_detail WHERE offer_id = $1 FOR UPDATE",
            )
            .bind(id.as_i32())
            .fetch_all(&mut *tx)
            .await?;

            for patch in patches {
                let matched = match_existing(&existing, patch);
                match matched {
                    Some(detail_id) => merge_detail(&mut tx, detail_id, patch).await?,
                    None => {
                        let new = require_complete(patch)?;
                        insert_detail(&mut tx, id.as_i32(), &new).await?;
                    }
                }
            }
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete an offer; details cascade.
    ///
    /// Returns `true` if the offer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OfferId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM offer WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a single offer detail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(
        &self,
        id: OfferDetailId,
    ) -> Result<Option<OfferDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, DetailRow>(
            "SELECT id, offer_id, title, revisions, delivery_time_in_days, price,
                    features, offer_type
             FROM offer_detail
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(DetailRow::into_domain).transpose()
    }

    /// Get a detail together with the owning business user.
    ///
    /// Used by order creation to derive the business side.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail_owner(
        &self,
        id: OfferDetailId,
    ) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT o.user_id
             FROM offer_detail d
             JOIN offer o ON o.id = d.offer_id
             WHERE d.id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(user_id,)| UserId::new(user_id)))
    }
}

/// Find the existing child a patch refers to: explicit id wins, tier is the
/// fallback discriminant. An id that matches no child means "new child",
/// not an error.
fn match_existing(existing: &[(i32, String)], patch: &OfferDetailPatch) -> Option<OfferDetailId> {
    if let Some(id) = patch.id
        && existing.iter().any(|(eid, _)| *eid == id.as_i32())
    {
        return Some(id);
    }

    let tier = patch.offer_type?;
    existing
        .iter()
        .find(|(_, t)| t == tier.as_str())
        .map(|(eid, _)| OfferDetailId::new(*eid))
}

/// An unmatched patch becomes an insert; all tier fields must be present.
fn require_complete(patch: &OfferDetailPatch) -> Result<NewOfferDetail, RepositoryError> {
    let incomplete = || {
        RepositoryError::Conflict(
            "new detail requires title, revisions, delivery_time_in_days, price, \
             features and offer_type"
                .to_owned(),
        )
    };

    Ok(NewOfferDetail {
        title: patch.title.clone().ok_or_else(incomplete)?,
        revisions: patch.revisions.ok_or_else(incomplete)?,
        delivery_time_in_days: patch.delivery_time_in_days.ok_or_else(incomplete)?,
        price: patch.price.ok_or_else(incomplete)?,
        features: patch.features.clone().ok_or_else(incomplete)?,
        offer_type: patch.offer_type.ok_or_else(incomplete)?,
    })
}

async fn insert_detail(
    tx: &mut Transaction<'_, Postgres>,
    offer_id: i32,
    detail: &NewOfferDetail,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO offer_detail
             (offer_id, title, revisions, delivery_time_in_days, price, features, offer_type)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(offer_id)
    .bind(&detail.title)
    .bind(detail.revisions)
    .bind(detail.delivery_time_in_days)
    .bind(detail.price)
    .bind(Json(&detail.features))
    .bind(detail.offer_type)
    .execute(&mut **tx)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "offer already has this tier"))?;

    Ok(())
}

async fn merge_detail(
    tx: &mut Transaction<'_, Postgres>,
    detail_id: OfferDetailId,
    patch: &OfferDetailPatch,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE offer_detail
         SET title                 = COALESCE($2, title),
             revisions             = COALESCE($3, revisions),
             delivery_time_in_days = COALESCE($4, delivery_time_in_days),
             price                 = COALESCE($5, price),
             features              = COALESCE($6, features),
             offer_type            = COALESCE($7, offer_type)
         WHERE id = $1",
    )
    .bind(detail_id.as_i32())
    .bind(patch.title.as_deref())
    .bind(patch.revisions)
    .bind(patch.delivery_time_in_days)
    .bind(patch.price)
    .bind(patch.features.as_ref().map(Json))
    .bind(patch.offer_type)
    .execute(&mut **tx)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "offer already has this tier"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(id: Option<i32>, tier: Option<OfferTier>) -> OfferDetailPatch {
        OfferDetailPatch {
            id: id.map(OfferDetailId::new),
            offer_type: tier,
            ..OfferDetailPatch::default()
        }
    }

    #[test]
    fn test_match_by_explicit_id() {
        let existing = vec![(1, "basic".to_owned()), (2, "standard".to_owned())];
        let m = match_existing(&existing, &patch(Some(2), Some(OfferTier::Basic)));
        // Explicit id wins over the tier discriminant.
        assert_eq!(m, Some(OfferDetailId::new(2)));
    }

    #[test]
    fn test_match_by_tier_when_no_id() {
        let existing = vec![(1, "basic".to_owned()), (2, "standard".to_owned())];
        let m = match_existing(&existing, &patch(None, Some(OfferTier::Standard)));
        assert_eq!(m, Some(OfferDetailId::new(2)));
    }

    #[test]
    fn test_unknown_id_falls_back_to_tier() {
        let existing = vec![(1, "basic".to_owned())];
        let m = match_existing(&existing, &patch(Some(99), Some(OfferTier::Basic)));
        assert_eq!(m, Some(OfferDetailId::new(1)));
    }

    #[test]
    fn test_unknown_key_means_new_child() {
        let existing = vec![(1, "basic".to_owned())];
        assert_eq!(match_existing(&existing, &patch(Some(99), Some(OfferTier::Premium))), None);
        assert_eq!(match_existing(&existing, &patch(None, None)), None);
    }

    #[test]
    fn test_insert_requires_all_fields() {
        let incomplete = OfferDetailPatch {
            title: Some("Premium".to_owned()),
            offer_type: Some(OfferTier::Premium),
            ..OfferDetailPatch::default()
        };
        assert!(matches!(
            require_complete(&incomplete),
            Err(RepositoryError::Conflict(_))
        ));

        let complete = OfferDetailPatch {
            title: Some("Premium".to_owned()),
            revisions: Some(5),
            delivery_time_in_days: Some(3),
            price: Some(Decimal::new(50000, 2)),
            features: Some(vec!["Everything".to_owned()]),
            offer_type: Some(OfferTier::Premium),
            id: None,
        };
        assert!(require_complete(&complete).is_ok());
    }

    #[test]
    fn test_ordering_whitelist() {
        assert_eq!(OfferOrdering::parse("min_price"), OfferOrdering::MinPriceAsc);
        assert_eq!(OfferOrdering::parse("-updated_at"), OfferOrdering::UpdatedAtDesc);
        // Unknown sort keys fall back to the default rather than erroring.
        assert_eq!(OfferOrdering::parse("id; DROP TABLE offer"), OfferOrdering::CreatedAtDesc);
    }
}
