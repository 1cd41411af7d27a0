//! User account domain types.

use chrono::{DateTime, Utc};

use giglet_core::{Email, Role, UserId};

/// A marketplace account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across the platform.
    pub username: String,
    /// User's email address, unique across the platform.
    pub email: Email,
    /// Account role (customer or business).
    pub role: Role,
    /// Display first name; empty string when unset.
    pub first_name: String,
    /// Display last name; empty string when unset.
    pub last_name: String,
    /// Staff accounts may delete orders.
    pub is_staff: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may publish offers.
    #[must_use]
    pub fn is_business(&self) -> bool {
        self.role == Role::Business
    }

    /// Whether this account may place orders and write reviews.
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}
