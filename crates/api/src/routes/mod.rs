//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /registration/          - Create an account (201 + token)
//! POST /login/                 - Obtain the account token
//!
//! # Offers
//! GET  /offers/                - List offers (filters: creator_id,
//!                                min_price, max_delivery_time, search,
//!                                ordering)
//! POST /offers/                - Create an offer (business only)
//! GET  /offers/{id}/           - Retrieve one offer
//! PATCH /offers/{id}/          - Merge scalars + reconcile details (owner)
//! DELETE /offers/{id}/         - Delete an offer (owner)
//! GET  /offerdetails/{id}/     - Retrieve one offer detail
//!
//! # Orders
//! GET  /orders/                - Caller's orders (either side)
//! POST /orders/                - Place an order (customer only)
//! PATCH /orders/{id}/          - Set status (business side only)
//! DELETE /orders/{id}/         - Delete an order (staff only)
//! GET  /orders/business/{id}/  - All orders on a business user's offers
//! GET  /order-count/{id}/      - In-progress order count
//! GET  /completed-order-count/{id}/ - Completed order count
//!
//! # Reviews
//! GET  /reviews/               - List reviews (filters: business_user_id,
//!                                reviewer_id, ordering)
//! POST /reviews/               - Write a review (customer only)
//! PATCH /reviews/{id}/         - Edit a review (author only)
//! DELETE /reviews/{id}/        - Delete a review (author only)
//!
//! # Profiles
//! GET  /profile/{id}/          - Retrieve a profile
//! PATCH /profile/{id}/         - Edit a profile (owner only)
//! GET  /profiles/business/     - All business profiles
//! GET  /profiles/customer/     - All customer profiles
//!
//! # Platform
//! GET  /base-info/             - Platform aggregate snapshot
//! ```

pub mod auth;
pub mod base_info;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the full API router.
///
/// The canonical paths carry a trailing slash; the server wraps this
/// router in a trim-trailing-slash layer, so routes are registered
/// without one and both spellings resolve.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(auth::register))
        .route("/login", post(auth::login))
        .route("/offers", get(offers::list).post(offers::create))
        .route(
            "/offers/{id}",
            get(offers::retrieve)
                .patch(offers::update)
                .delete(offers::delete),
        )
        .route("/offerdetails/{id}", get(offers::retrieve_detail))
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            patch(orders::update).delete(orders::delete),
        )
        .route(
            "/orders/business/{business_user_id}",
            get(orders::list_for_business),
        )
        .route(
            "/order-count/{business_user_id}",
            get(orders::in_progress_count),
        )
        .route(
            "/completed-order-count/{business_user_id}",
            get(orders::completed_count),
        )
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/reviews/{id}",
            patch(reviews::update).delete(reviews::delete),
        )
        .route(
            "/profile/{id}",
            get(profiles::retrieve).patch(profiles::update),
        )
        .route("/profiles/business", get(profiles::list_business))
        .route("/profiles/customer", get(profiles::list_customer))
        .route("/base-info", get(base_info::base_info))
}
