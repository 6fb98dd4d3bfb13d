// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ApiError, state::AppState, storage::StoreError};

pub mod auth;
pub mod health;
pub mod payment_methods;
pub mod payments;
pub mod transactions;
pub mod users;

/// Translate a store error into an HTTP boundary error. `not_found` is the
/// client-facing message for missing records; everything else is logged and
/// surfaced as an opaque 500.
pub(crate) fn store_error(err: StoreError, not_found: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => ApiError::not_found(not_found),
        other => {
            tracing::error!(error = %other, "record store operation failed");
            ApiError::internal("Internal server error")
        }
    }
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/nonce", get(auth::issue_nonce))
        .route("/auth/complete", post(auth::complete_auth))
        .route("/payments/initiate", post(payments::initiate_payment))
        .route("/payments/verify", post(payments::verify_payment))
        .route(
            "/users/{user_id}",
            get(users::get_user).patch(users::update_user),
        )
        .route(
            "/users/{user_id}/payment-methods",
            get(payment_methods::list_payment_methods)
                .post(payment_methods::create_payment_method),
        )
        .route(
            "/users/{user_id}/transactions",
            get(transactions::list_transactions),
        )
        .route(
            "/payment-methods/{method_id}",
            put(payment_methods::update_payment_method)
                .delete(payment_methods::delete_payment_method),
        )
        .route(
            "/payment-methods/{method_id}/default",
            post(payment_methods::set_default_payment_method),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::issue_nonce,
        auth::complete_auth,
        payments::initiate_payment,
        payments::verify_payment,
        users::get_user,
        users::update_user,
        payment_methods::list_payment_methods,
        payment_methods::create_payment_method,
        payment_methods::update_payment_method,
        payment_methods::delete_payment_method,
        payment_methods::set_default_payment_method,
        transactions::list_transactions
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            auth::NonceResponse,
            auth::CompleteAuthRequest,
            auth::AuthResponse,
            crate::auth::WalletAuthPayload,
            payments::InitiatePaymentRequest,
            payments::InitiatePaymentResponse,
            payments::VerifyPaymentRequest,
            payments::VerifyPaymentResponse,
            payments::VerifyFailureResponse,
            payments::VerifiedTransaction,
            users::UserResponse,
            users::UpdateUserRequest,
            payment_methods::PaymentMethodResponse,
            payment_methods::PaymentMethodListResponse,
            payment_methods::CreatePaymentMethodRequest,
            payment_methods::UpdatePaymentMethodRequest,
            payment_methods::SetDefaultRequest,
            payment_methods::AckResponse,
            transactions::TransactionListResponse,
            crate::models::WalletAddress,
            crate::storage::MethodDetails,
            crate::storage::StoredTransaction,
            crate::storage::TxStatus
        )
    ),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Auth", description = "SIWE wallet authentication"),
        (name = "Payments", description = "Conversion initiation and verification"),
        (name = "Users", description = "User profile and KYC"),
        (name = "PaymentMethods", description = "Withdrawal destinations"),
        (name = "Transactions", description = "Conversion history")
    )
)]
struct ApiDoc;
