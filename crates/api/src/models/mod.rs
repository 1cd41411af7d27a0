//! Domain models.
//!
//! These types represent validated domain objects separate from database
//! row types; the `db` modules own the row mapping.

pub mod offer;
pub mod order;
pub mod profile;
pub mod review;
pub mod user;

pub use offer::{Offer, OfferDetail, OfferWithDetails};
pub use order::Order;
pub use profile::Profile;
pub use review::Review;
pub use user::User;
