//! Database operations for the Giglet `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `user_account` - Marketplace accounts (customer or business)
//! - `auth_token` - Opaque API tokens, one per account
//! - `profile` - 1:1 display/contact metadata per account
//! - `offer` - Business offers
//! - `offer_detail` - Priced tiers of an offer (cascade-deleted with it)
//! - `purchase_order` - Customer purchases of one offer detail
//! - `review` - Customer ratings of business accounts, unique per pair
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p giglet-cli -- migrate
//! ```

pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;
pub mod stats;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use offers::OfferRepository;
pub use orders::OrderRepository;
pub use profiles::ProfileRepository;
pub use reviews::ReviewRepository;
pub use stats::StatsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate review pair).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate a unique-constraint violation into a `Conflict`, leaving
    /// other database errors as-is.
    pub(crate) fn from_unique_violation(e: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_msg.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
