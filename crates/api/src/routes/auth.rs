//! Registration and login routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use giglet_core::UserId;

use crate::error::Result;
use crate::services::auth::{AuthService, AuthenticatedUser};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub repeated_password: String,
    /// Account type: "customer" or "business".
    #[serde(rename = "type", default)]
    pub account_type: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token response for both registration and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: UserId,
}

impl From<AuthenticatedUser> for TokenResponse {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            token: auth.token,
            username: auth.user.username,
            email: auth.user.email.into_inner(),
            user_id: auth.user.id,
        }
    }
}

/// Register a new account.
///
/// POST /registration/
///
/// # Errors
///
/// Returns a per-field validation error map (400) for invalid payloads or
/// taken usernames/emails.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let auth = AuthService::new(state.pool());

    let authenticated = auth
        .register(
            &req.username,
            &req.email,
            &req.password,
            &req.repeated_password,
            &req.account_type,
        )
        .await?;

    tracing::info!(user_id = %authenticated.user.id, "account registered");

    Ok((StatusCode::CREATED, Json(authenticated.into())))
}

/// Log in with username and password.
///
/// POST /login/
///
/// # Errors
///
/// Returns 400 for unknown usernames or wrong passwords.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let auth = AuthService::new(state.pool());

    let authenticated = auth.login(&req.username, &req.password).await?;

    Ok(Json(authenticated.into()))
}
