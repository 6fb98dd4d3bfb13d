// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Wallet authentication endpoints (SIWE / wallet-auth).

use axum::{extract::State, response::IntoResponse, response::Response, Json};
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    auth::{verify_wallet_auth, WalletAuthPayload},
    error::ApiError,
    models::WalletAddress,
    session,
    state::AppState,
    storage::UserRepository,
};

use super::store_error;

/// Response for GET /v1/auth/nonce
#[derive(Debug, Serialize, ToSchema)]
pub struct NonceResponse {
    /// Nonce the wallet must embed in the signed SIWE message.
    pub nonce: String,
}

/// Request body for POST /v1/auth/complete
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteAuthRequest {
    /// Wallet-auth result from the mini-app host.
    pub payload: WalletAuthPayload,
    /// Nonce the client believes it was issued.
    pub nonce: String,
}

/// Response for POST /v1/auth/complete
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    /// Authenticated wallet address.
    pub address: String,
    /// Directory record backing this wallet.
    pub user_id: String,
    /// Whether the record was created by this authentication.
    pub is_new_user: bool,
    /// Whether profile and KYC fields are all filled in.
    pub is_profile_complete: bool,
}

/// Issue a fresh single-use nonce for a wallet-auth attempt.
///
/// The nonce is also stored in a signed, short-lived cookie so the
/// completion request can be checked without server-side session state.
#[utoipa::path(
    get,
    path = "/v1/auth/nonce",
    tag = "Auth",
    responses(
        (status = 200, description = "Nonce issued", body = NonceResponse)
    )
)]
pub async fn issue_nonce(jar: SignedCookieJar) -> (SignedCookieJar, Json<NonceResponse>) {
    let nonce = session::generate_nonce();
    let jar = jar.add(session::nonce_cookie(&nonce));
    (jar, Json(NonceResponse { nonce }))
}

/// Complete wallet authentication.
///
/// Verifies the signed SIWE message against the cookie-bound nonce, then
/// finds or creates the user record for the recovered wallet address. The
/// nonce cookie is cleared as soon as the signature verifies; a failed user
/// lookup afterwards does not re-arm it.
#[utoipa::path(
    post,
    path = "/v1/auth/complete",
    tag = "Auth",
    request_body = CompleteAuthRequest,
    responses(
        (status = 200, description = "Wallet authenticated", body = AuthResponse),
        (status = 400, description = "Nonce missing, mismatched, or signature invalid"),
        (status = 503, description = "Record store unavailable")
    )
)]
pub async fn complete_auth(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<CompleteAuthRequest>,
) -> Result<Response, ApiError> {
    let Some(expected_nonce) = session::stored_nonce(&jar) else {
        return Err(ApiError::bad_request("Invalid nonce. Please try again."));
    };

    if request.nonce != expected_nonce {
        return Err(ApiError::bad_request("Invalid nonce. Please try again."));
    }

    if let Err(e) = verify_wallet_auth(&request.payload, &expected_nonce, Utc::now()) {
        warn!(error = %e, "wallet auth verification failed");
        return Err(ApiError::bad_request(
            "Verification failed. Please try again.",
        ));
    }

    // Single use: the nonce is spent once the signature checks out.
    let jar = session::clear_nonce(jar);

    let store = match state.store() {
        Ok(store) => store,
        Err(e) => return Ok((jar, e).into_response()),
    };

    let repo = UserRepository::new(store);
    let address = WalletAddress::from(request.payload.address.clone());

    let lookup = match repo.find_by_wallet(&address) {
        Ok(found) => found,
        Err(e) => return Ok((jar, store_error(e, "User not found")).into_response()),
    };

    let (user, is_new_user) = match lookup {
        Some(user) => (user, false),
        None => match repo.find_or_create(&address) {
            Ok(user) => (user, true),
            Err(e) => return Ok((jar, store_error(e, "User not found")).into_response()),
        },
    };

    info!(user_id = %user.id, is_new_user, "wallet authenticated");

    let is_profile_complete = user.is_profile_complete();
    let response = AuthResponse {
        success: true,
        address: request.payload.address,
        user_id: user.id,
        is_new_user,
        is_profile_complete,
    };
    Ok((jar, Json(response)).into_response())
}
