//! Profile domain types.

use chrono::{DateTime, Utc};

use giglet_core::{Role, UserId};

/// Display/contact metadata attached 1:1 to a user account.
///
/// Created in the same transaction as the account, never independently.
/// All optional text fields default to the empty string; the API never
/// serializes them as null.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Owning account (also the primary key).
    pub user_id: UserId,
    /// Account username (joined from the user row).
    pub username: String,
    /// Display first name.
    pub first_name: String,
    /// Display last name.
    pub last_name: String,
    /// Account email (joined from the user row).
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Profile picture path.
    pub file: String,
    /// Free-text location.
    pub location: String,
    /// Contact phone number.
    pub tel: String,
    /// Free-text description.
    pub description: String,
    /// Free-text working hours.
    pub working_hours: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
