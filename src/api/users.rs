// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! User profile and KYC endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    state::AppState,
    storage::{StoredUser, UserRepository},
};

use super::store_error;

/// User profile returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    /// Whether profile and KYC fields are all filled in.
    pub is_profile_complete: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        let is_profile_complete = user.is_profile_complete();
        Self {
            id: user.id,
            wallet_address: user.wallet_address,
            full_name: user.full_name,
            email: user.email,
            mobile_number: user.mobile_number,
            aadhaar_number: user.aadhaar_number,
            pan_number: user.pan_number,
            is_profile_complete,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for PATCH /v1/users/{user_id}
///
/// Absent fields are left unchanged; an empty or whitespace-only value
/// clears the field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub aadhaar_number: Option<String>,
    #[serde(default)]
    pub pan_number: Option<String>,
}

/// Get a user's profile.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let store = state.store()?;
    let user = UserRepository::new(store)
        .get(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;
    Ok(Json(user.into()))
}

/// Update a user's profile and KYC fields.
#[utoipa::path(
    patch,
    path = "/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let store = state.store()?;
    let repo = UserRepository::new(store);

    let mut user = repo
        .get(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;

    apply_field(&mut user.full_name, request.full_name);
    apply_field(&mut user.email, request.email);
    apply_field(&mut user.mobile_number, request.mobile_number);
    apply_field(&mut user.aadhaar_number, request.aadhaar_number);
    apply_field(&mut user.pan_number, request.pan_number);
    user.updated_at = chrono::Utc::now();

    repo.update(&user)
        .map_err(|e| store_error(e, "User not found"))?;

    info!(user_id = %user.id, "user profile updated");
    Ok(Json(user.into()))
}

fn apply_field(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        *target = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_field_is_left_alone() {
        let mut field = Some("keep".to_string());
        apply_field(&mut field, None);
        assert_eq!(field.as_deref(), Some("keep"));
    }

    #[test]
    fn provided_field_is_trimmed() {
        let mut field = None;
        apply_field(&mut field, Some("  Asha Rao  ".to_string()));
        assert_eq!(field.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn empty_value_clears_the_field() {
        let mut field = Some("old".to_string());
        apply_field(&mut field, Some("   ".to_string()));
        assert_eq!(field, None);
    }
}
