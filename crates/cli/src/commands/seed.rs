//! Seed the database with demo marketplace data.
//!
//! Creates one business account with a three-tier offer, one customer
//! account, and a review, so a fresh instance has something to browse.
//! Safe to re-run: seeding stops early if the demo business user already
//! exists.

use rust_decimal::Decimal;
use tracing::info;

use giglet_core::OfferTier;

use giglet_api::db;
use giglet_api::db::offers::{NewOfferDetail, OfferRepository};
use giglet_api::db::reviews::ReviewRepository;
use giglet_api::db::users::UserRepository;
use giglet_api::services::auth::AuthService;

const DEMO_BUSINESS: &str = "demo_studio";
const DEMO_CUSTOMER: &str = "demo_customer";
const DEMO_PASSWORD: &str = "demo-password-1";

/// Insert the demo data set.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    if UserRepository::new(&pool)
        .get_by_username(DEMO_BUSINESS)
        .await?
        .is_some()
    {
        info!("Demo data already present, nothing to do");
        return Ok(());
    }

    let auth = AuthService::new(&pool);

    let business = auth
        .register(
            DEMO_BUSINESS,
            "studio@example.com",
            DEMO_PASSWORD,
            DEMO_PASSWORD,
            "business",
        )
        .await?;
    info!(user_id = %business.user.id, "Created demo business account");

    let customer = auth
        .register(
            DEMO_CUSTOMER,
            "customer@example.com",
            DEMO_PASSWORD,
            DEMO_PASSWORD,
            "customer",
        )
        .await?;
    info!(user_id = %customer.user.id, "Created demo customer account");

    let details = [
        NewOfferDetail {
            title: "Basic logo".to_string(),
            revisions: 2,
            delivery_time_in_days: 5,
            price: Decimal::new(15_000, 2),
            features: vec!["Logo design".to_string()],
            offer_type: OfferTier::Basic,
        },
        NewOfferDetail {
            title: "Standard branding".to_string(),
            revisions: 5,
            delivery_time_in_days: 7,
            price: Decimal::new(35_000, 2),
            features: vec!["Logo design".to_string(), "Business card".to_string()],
            offer_type: OfferTier::Standard,
        },
        NewOfferDetail {
            title: "Premium identity".to_string(),
            revisions: 10,
            delivery_time_in_days: 10,
            price: Decimal::new(50_000, 2),
            features: vec![
                "Logo design".to_string(),
                "Business card".to_string(),
                "Style guide".to_string(),
            ],
            offer_type: OfferTier::Premium,
        },
    ];

    let offer_id = OfferRepository::new(&pool)
        .create(
            business.user.id,
            "Brand identity design",
            "",
            "Complete visual identity for your company.",
            &details,
        )
        .await?;
    info!(offer_id = %offer_id, "Created demo offer");

    ReviewRepository::new(&pool)
        .create(
            customer.user.id,
            business.user.id,
            5,
            "Fast turnaround, great results.",
        )
        .await?;
    info!("Created demo review");

    info!("Seeding complete!");
    Ok(())
}
