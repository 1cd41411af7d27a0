//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Resolve the API database URL (`GIGLET_DATABASE_URL`, falling back to
/// `DATABASE_URL`).
pub(crate) fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    std::env::var("GIGLET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "GIGLET_DATABASE_URL not set".into())
}
