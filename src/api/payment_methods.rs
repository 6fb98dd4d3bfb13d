// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Withdrawal payment method endpoints (bank transfer or UPI).

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
    storage::{MethodDetails, PaymentMethodRepository, StoredPaymentMethod, UserRepository},
};

use super::store_error;

/// Payment method returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodResponse {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub details: MethodDetails,
    /// Whether this is the user's default withdrawal destination.
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentMethodResponse {
    fn from_stored(method: StoredPaymentMethod, is_default: bool) -> Self {
        Self {
            id: method.id,
            user_id: method.user_id,
            details: method.details,
            is_default,
            created_at: method.created_at.to_rfc3339(),
            updated_at: method.updated_at.to_rfc3339(),
        }
    }
}

/// List response for a user's payment methods.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodListResponse {
    pub payment_methods: Vec<PaymentMethodResponse>,
    pub total: usize,
}

/// Request body for POST /v1/users/{user_id}/payment-methods
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentMethodRequest {
    #[serde(flatten)]
    pub details: MethodDetails,
    /// Make this the default destination.
    #[serde(default)]
    pub is_default: bool,
}

/// Request body for PUT /v1/payment-methods/{method_id}
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentMethodRequest {
    #[serde(flatten)]
    pub details: MethodDetails,
}

/// Request body for POST /v1/payment-methods/{method_id}/default
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetDefaultRequest {
    /// Owner of the method; setting another user's method is rejected.
    pub user_id: String,
}

/// Generic success acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
}

fn validate_details(details: &MethodDetails) -> Result<(), ApiError> {
    let complete = match details {
        MethodDetails::Bank {
            bank_name,
            account_number,
            ifsc_code,
            account_holder_name,
        } => {
            !bank_name.trim().is_empty()
                && !account_number.trim().is_empty()
                && !ifsc_code.trim().is_empty()
                && !account_holder_name.trim().is_empty()
        }
        MethodDetails::Upi {
            upi_id,
            upi_app,
            upi_mobile_number,
        } => {
            !upi_id.trim().is_empty()
                && !upi_app.trim().is_empty()
                && !upi_mobile_number.trim().is_empty()
        }
    };

    if complete {
        Ok(())
    } else {
        Err(ApiError::bad_request("Missing required fields"))
    }
}

/// List a user's payment methods, default first.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/payment-methods",
    tag = "PaymentMethods",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Payment methods", body = PaymentMethodListResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PaymentMethodListResponse>, ApiError> {
    let store = state.store()?;

    UserRepository::new(store)
        .get(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;

    let methods = PaymentMethodRepository::new(store)
        .list_by_user(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;

    let payment_methods: Vec<PaymentMethodResponse> = methods
        .into_iter()
        .map(|(method, is_default)| PaymentMethodResponse::from_stored(method, is_default))
        .collect();
    let total = payment_methods.len();

    Ok(Json(PaymentMethodListResponse {
        payment_methods,
        total,
    }))
}

/// Add a payment method for a user.
///
/// The first method a user adds becomes their default automatically.
#[utoipa::path(
    post,
    path = "/v1/users/{user_id}/payment-methods",
    tag = "PaymentMethods",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = CreatePaymentMethodRequest,
    responses(
        (status = 200, description = "Payment method created", body = PaymentMethodResponse),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_payment_method(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<CreatePaymentMethodRequest>,
) -> Result<Json<PaymentMethodResponse>, ApiError> {
    validate_details(&request.details)?;

    let store = state.store()?;
    UserRepository::new(store)
        .get(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;

    let repo = PaymentMethodRepository::new(store);
    let existing = repo
        .list_by_user(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;
    let is_default = request.is_default || existing.is_empty();

    let method = repo
        .create(&user_id, request.details, is_default)
        .map_err(|e| store_error(e, "User not found"))?;

    info!(user_id = %user_id, method_id = %method.id, "payment method added");
    Ok(Json(PaymentMethodResponse::from_stored(method, is_default)))
}

/// Replace the details of an existing payment method.
#[utoipa::path(
    put,
    path = "/v1/payment-methods/{method_id}",
    tag = "PaymentMethods",
    params(("method_id" = String, Path, description = "Payment method ID")),
    request_body = UpdatePaymentMethodRequest,
    responses(
        (status = 200, description = "Payment method updated", body = PaymentMethodResponse),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Payment method not found")
    )
)]
pub async fn update_payment_method(
    State(state): State<AppState>,
    Path(method_id): Path<String>,
    Json(request): Json<UpdatePaymentMethodRequest>,
) -> Result<Json<PaymentMethodResponse>, ApiError> {
    validate_details(&request.details)?;

    let store = state.store()?;
    let repo = PaymentMethodRepository::new(store);

    let method = repo
        .update_details(&method_id, request.details)
        .map_err(|e| store_error(e, "Payment method not found"))?;
    let is_default = repo
        .default_method_id(&method.user_id)
        .map_err(|e| store_error(e, "Payment method not found"))?
        .as_deref()
        == Some(method.id.as_str());

    Ok(Json(PaymentMethodResponse::from_stored(method, is_default)))
}

/// Delete a payment method.
#[utoipa::path(
    delete,
    path = "/v1/payment-methods/{method_id}",
    tag = "PaymentMethods",
    params(("method_id" = String, Path, description = "Payment method ID")),
    responses(
        (status = 200, description = "Payment method deleted", body = AckResponse),
        (status = 404, description = "Payment method not found")
    )
)]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    Path(method_id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    let store = state.store()?;
    PaymentMethodRepository::new(store)
        .delete(&method_id)
        .map_err(|e| store_error(e, "Payment method not found"))?;

    info!(method_id = %method_id, "payment method deleted");
    Ok(Json(AckResponse { success: true }))
}

/// Mark a payment method as the user's default.
#[utoipa::path(
    post,
    path = "/v1/payment-methods/{method_id}/default",
    tag = "PaymentMethods",
    params(("method_id" = String, Path, description = "Payment method ID")),
    request_body = SetDefaultRequest,
    responses(
        (status = 200, description = "Default updated", body = AckResponse),
        (status = 404, description = "Payment method not found for this user")
    )
)]
pub async fn set_default_payment_method(
    State(state): State<AppState>,
    Path(method_id): Path<String>,
    Json(request): Json<SetDefaultRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let store = state.store()?;
    PaymentMethodRepository::new(store)
        .set_default(&method_id, &request.user_id)
        .map_err(|e| store_error(e, "Payment method not found"))?;

    info!(method_id = %method_id, user_id = %request.user_id, "default payment method set");
    Ok(Json(AckResponse { success: true }))
}
