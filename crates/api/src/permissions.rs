//! Role and ownership checks.
//!
//! Pure predicates over already-loaded domain values. Detail handlers load
//! the entity first and return 404 for unknown ids before consulting any
//! predicate here; a failing check then yields 403. List handlers filter
//! in the query instead of rejecting.

use giglet_core::UserId;

use crate::models::{Order, Review, User};

/// Only business accounts may publish offers.
#[must_use]
pub fn can_create_offer(user: &User) -> bool {
    user.is_business()
}

/// Only the owning business account may modify or delete an offer.
#[must_use]
pub fn can_modify_offer(user: &User, offer_owner: UserId) -> bool {
    user.id == offer_owner
}

/// Only customer accounts may place orders.
#[must_use]
pub fn can_create_order(user: &User) -> bool {
    user.is_customer()
}

/// Only the business side of an order may change its status.
#[must_use]
pub fn can_update_order_status(user: &User, order: &Order) -> bool {
    order.business_user == user.id
}

/// Only staff accounts may delete orders.
#[must_use]
pub fn can_delete_order(user: &User) -> bool {
    user.is_staff
}

/// Customers may review business accounts, never themselves.
#[must_use]
pub fn can_create_review(reviewer: &User, target: &User) -> bool {
    reviewer.is_customer() && target.is_business() && reviewer.id != target.id
}

/// Only the author may modify or delete a review.
#[must_use]
pub fn can_modify_review(user: &User, review: &Review) -> bool {
    review.reviewer == user.id
}

/// Only the account holder may edit their profile.
#[must_use]
pub fn can_edit_profile(user: &User, profile_user: UserId) -> bool {
    user.id == profile_user
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use giglet_core::{
        Email, OfferDetailId, OfferTier, OrderId, OrderStatus, ReviewId, Role, UserId,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn user(id: i32, role: Role, is_staff: bool) -> User {
        User {
            id: UserId::new(id),
            username: format!("user{id}"),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            role,
            first_name: String::new(),
            last_name: String::new(),
            is_staff,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(customer: i32, business: i32) -> Order {
        Order {
            id: OrderId::new(1),
            customer_user: UserId::new(customer),
            business_user: UserId::new(business),
            offer_detail_id: OfferDetailId::new(1),
            title: "Logo Design".to_string(),
            revisions: 3,
            delivery_time_in_days: 5,
            price: Decimal::new(15_000, 2),
            features: vec!["Logo".to_string()],
            offer_type: OfferTier::Basic,
            status: OrderStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn review(reviewer: i32, business: i32) -> Review {
        Review {
            id: ReviewId::new(1),
            business_user: UserId::new(business),
            reviewer: UserId::new(reviewer),
            rating: 4,
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_offer_creation_is_business_only() {
        assert!(can_create_offer(&user(1, Role::Business, false)));
        assert!(!can_create_offer(&user(2, Role::Customer, false)));
        // Staff flag grants nothing here
        assert!(!can_create_offer(&user(3, Role::Customer, true)));
    }

    #[test]
    fn test_offer_modification_is_owner_only() {
        let owner = user(1, Role::Business, false);
        let other = user(2, Role::Business, false);
        assert!(can_modify_offer(&owner, UserId::new(1)));
        assert!(!can_modify_offer(&other, UserId::new(1)));
    }

    #[test]
    fn test_order_creation_is_customer_only() {
        assert!(can_create_order(&user(1, Role::Customer, false)));
        assert!(!can_create_order(&user(2, Role::Business, false)));
    }

    #[test]
    fn test_order_status_is_business_side_only() {
        let order = order(1, 2);
        assert!(can_update_order_status(
            &user(2, Role::Business, false),
            &order
        ));
        // The customer side may not advance the status
        assert!(!can_update_order_status(
            &user(1, Role::Customer, false),
            &order
        ));
        assert!(!can_update_order_status(
            &user(3, Role::Business, false),
            &order
        ));
        // Staff gain nothing here either
        assert!(!can_update_order_status(
            &user(4, Role::Customer, true),
            &order
        ));
    }

    #[test]
    fn test_order_deletion_is_staff_only() {
        assert!(can_delete_order(&user(9, Role::Customer, true)));
        // Neither participant may delete without the staff flag
        assert!(!can_delete_order(&user(1, Role::Customer, false)));
        assert!(!can_delete_order(&user(2, Role::Business, false)));
    }

    #[test]
    fn test_review_creation_requires_customer_and_business_target() {
        let customer = user(1, Role::Customer, false);
        let business = user(2, Role::Business, false);
        let other_customer = user(3, Role::Customer, false);

        assert!(can_create_review(&customer, &business));
        assert!(!can_create_review(&business, &customer));
        assert!(!can_create_review(&customer, &other_customer));
        assert!(!can_create_review(&customer, &customer));
    }

    #[test]
    fn test_review_modification_is_author_only() {
        let review = review(1, 2);
        assert!(can_modify_review(&user(1, Role::Customer, false), &review));
        // Not even the reviewed business may touch it
        assert!(!can_modify_review(&user(2, Role::Business, false), &review));
    }

    #[test]
    fn test_profile_editing_is_self_only() {
        let me = user(1, Role::Customer, false);
        assert!(can_edit_profile(&me, UserId::new(1)));
        assert!(!can_edit_profile(&me, UserId::new(2)));
    }
}
