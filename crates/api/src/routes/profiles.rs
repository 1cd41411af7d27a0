//! Profile routes.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giglet_core::{Email, Role, UserId};

use crate::db::profiles::{ProfileChanges, ProfileRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Profile;
use crate::permissions;
use crate::state::AppState;

/// Full profile body for the detail route.
#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub user: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: String,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileBody {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user_id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            file: profile.file,
            location: profile.location,
            tel: profile.tel,
            description: profile.description,
            working_hours: profile.working_hours,
            role: profile.role,
            email: profile.email,
            created_at: profile.created_at,
        }
    }
}

/// Business list item: contact fields, no timestamps.
#[derive(Debug, Serialize)]
pub struct BusinessProfileItem {
    pub user: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: String,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub role: Role,
}

impl From<Profile> for BusinessProfileItem {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user_id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            file: profile.file,
            location: profile.location,
            tel: profile.tel,
            description: profile.description,
            working_hours: profile.working_hours,
            role: profile.role,
        }
    }
}

/// Customer list item: display fields plus the upload timestamp.
#[derive(Debug, Serialize)]
pub struct CustomerProfileItem {
    pub user: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Profile> for CustomerProfileItem {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user_id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            file: profile.file,
            role: profile.role,
            uploaded_at: profile.created_at,
        }
    }
}

/// Profile update request; user-row and profile-row fields merge atomically.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub file: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
}

/// Retrieve a profile.
///
/// GET /profile/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<ProfileBody>> {
    let profile = ProfileRepository::new(state.pool())
        .get(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;

    Ok(Json(profile.into()))
}

/// Partially update a profile.
///
/// PATCH /profile/{id}/
///
/// # Errors
///
/// Returns 404 for unknown profiles, 403 unless the caller owns it, and a
/// 400 field error for invalid or taken emails.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileBody>> {
    let id = UserId::new(id);
    let repo = ProfileRepository::new(state.pool());

    repo.get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;

    if !permissions::can_edit_profile(&user, id) {
        return Err(AppError::Forbidden(
            "You may only edit your own profile.".to_owned(),
        ));
    }

    let email = req
        .email
        .map(|raw| Email::parse(&raw))
        .transpose()
        .map_err(|e| AppError::field("email", &e.to_string()))?;

    let changes = ProfileChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        email: email.map(Email::into_inner),
        file: req.file,
        location: req.location,
        tel: req.tel,
        description: req.description,
        working_hours: req.working_hours,
    };

    let profile = repo.update(id, changes).await?;

    Ok(Json(profile.into()))
}

/// List all business profiles.
///
/// GET /profiles/business/
pub async fn list_business(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
) -> Result<Json<Vec<BusinessProfileItem>>> {
    let profiles = ProfileRepository::new(state.pool())
        .list_by_role(Role::Business)
        .await?;

    Ok(Json(
        profiles.into_iter().map(BusinessProfileItem::from).collect(),
    ))
}

/// List all customer profiles.
///
/// GET /profiles/customer/
pub async fn list_customer(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
) -> Result<Json<Vec<CustomerProfileItem>>> {
    let profiles = ProfileRepository::new(state.pool())
        .list_by_role(Role::Customer)
        .await?;

    Ok(Json(
        profiles.into_iter().map(CustomerProfileItem::from).collect(),
    ))
}
