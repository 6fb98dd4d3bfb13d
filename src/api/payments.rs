// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Conversion payment endpoints: initiate and verify.
//!
//! Initiation records a pending conversion and binds a payment session to
//! the client via a signed cookie. Verification asks the Developer Portal
//! for the host-reported transaction, cross-checks the reference against
//! the session, and commits a terminal status exactly once.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::WalletAddress,
    providers::PortalTransaction,
    session::{self, PaymentSession},
    state::AppState,
    storage::{StoredTransaction, TransactionRepository, TxStatus, UserRepository},
};

use super::store_error;

/// Request body for POST /v1/payments/initiate
#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    /// Token-denominated amount to convert.
    pub amount: f64,
    /// Token symbol (e.g. WLD, USDC).
    pub token: String,
    /// Wallet the tokens will be sent from; must belong to a known user.
    pub wallet: String,
}

/// Response for POST /v1/payments/initiate
#[derive(Debug, Serialize, ToSchema)]
pub struct InitiatePaymentResponse {
    pub success: bool,
    /// Reference the wallet host must attach to the transfer.
    pub reference_id: String,
}

/// Request body for POST /v1/payments/verify
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    /// Host-issued transaction identifier from the pay command result.
    pub transaction_id: String,
}

/// Settled transaction details returned on successful verification.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedTransaction {
    /// Final status (`success` or `pending`).
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    pub token: String,
    pub amount: f64,
    pub from: String,
    pub to: String,
    /// When the conversion was last updated.
    pub timestamp: String,
}

/// Response for POST /v1/payments/verify
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub transaction: VerifiedTransaction,
}

/// Failure body for a verification that did not check out.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyFailureResponse {
    pub success: bool,
    pub error: String,
}

/// Begin a conversion.
///
/// Validates the request, records a pending conversion keyed by a fresh
/// reference ID, and binds the session to the client in a signed cookie.
#[utoipa::path(
    post,
    path = "/v1/payments/initiate",
    tag = "Payments",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Conversion initiated", body = InitiatePaymentResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "User not found"),
        (status = 503, description = "Deposit address or store unavailable")
    )
)]
pub async fn initiate_payment(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<(SignedCookieJar, Json<InitiatePaymentResponse>), ApiError> {
    if request.token.trim().is_empty()
        || request.wallet.trim().is_empty()
        || !request.amount.is_finite()
        || request.amount <= 0.0
    {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let recipient = state.platform_recipient()?.to_string();
    let store = state.store()?;

    let wallet = WalletAddress::from(request.wallet.trim());
    let user = UserRepository::new(store)
        .find_by_wallet(&wallet)
        .map_err(|e| store_error(e, "User not found"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let tx = StoredTransaction::new_pending(
        user.id.clone(),
        request.wallet.trim().to_string(),
        recipient,
        request.token.trim().to_string(),
        request.amount,
    );

    TransactionRepository::new(store)
        .create(&tx)
        .map_err(|e| store_error(e, "Transaction not found"))?;

    let payment_session = PaymentSession {
        reference_id: tx.reference_id.clone(),
        amount: tx.token_amount,
        token: tx.token_symbol.clone(),
        wallet: tx.sender_wallet_address.clone(),
        timestamp: Utc::now().timestamp_millis(),
    };
    let cookie = session::payment_cookie(&payment_session).map_err(|e| {
        warn!(error = %e, "failed to serialize payment session");
        ApiError::internal("Internal server error")
    })?;
    let jar = jar.add(cookie);

    info!(
        user_id = %user.id,
        reference_id = %tx.reference_id,
        token = %tx.token_symbol,
        "conversion initiated"
    );

    Ok((
        jar,
        Json(InitiatePaymentResponse {
            success: true,
            reference_id: tx.reference_id,
        }),
    ))
}

/// Verify a conversion against the Developer Portal.
///
/// The reference stored in the payment-session cookie must match the
/// portal's record for the host-issued transaction ID. A conversion already
/// resolved locally returns its stored outcome without another portal call.
#[utoipa::path(
    post,
    path = "/v1/payments/verify",
    tag = "Payments",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyPaymentResponse),
        (status = 400, description = "Verification failed", body = VerifyFailureResponse),
        (status = 404, description = "No conversion for this session"),
        (status = 503, description = "Portal or store unavailable")
    )
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Response, ApiError> {
    if request.transaction_id.trim().is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let Some(payment_session) = session::stored_payment_session(&jar) else {
        return Err(ApiError::bad_request(
            "Payment session expired or not found",
        ));
    };

    let store = state.store()?;
    let repo = TransactionRepository::new(store);

    let tx = repo
        .get_by_reference(&payment_session.reference_id)
        .map_err(|e| store_error(e, "Transaction not found"))?;

    // Already resolved: return the stored outcome without asking the portal
    // again. Repeated verify calls are idempotent.
    if tx.status.is_terminal() {
        return Ok(resolved_response(jar, &tx));
    }

    let portal = state.portal()?;
    let report = portal
        .fetch_transaction(request.transaction_id.trim())
        .await
        .map_err(|e| {
            warn!(error = %e, reference_id = %tx.reference_id, "portal lookup failed");
            ApiError::internal("Failed to verify payment")
        })?;

    let status = evaluate_report(&report, &tx.reference_id);
    // Only a report for our own reference may contribute a hash; a
    // mismatching report describes someone else's transfer.
    let hash = if report.reference == tx.reference_id {
        report.transaction_hash.as_deref()
    } else {
        None
    };
    let updated = repo
        .update_status(&tx.reference_id, status, hash)
        .map_err(|e| store_error(e, "Transaction not found"))?;

    info!(
        reference_id = %updated.reference_id,
        status = ?updated.status,
        "conversion verification recorded"
    );

    Ok(resolved_response(jar, &updated))
}

/// Map a portal report onto the local status machine.
///
/// The reference must match the locally issued one and the portal must not
/// report failure. Settlement commits only on an explicit `success`; any
/// other non-failed status leaves the conversion pending.
fn evaluate_report(report: &PortalTransaction, expected_reference: &str) -> TxStatus {
    if report.reference != expected_reference || report.transaction_status == "failed" {
        return TxStatus::Failed;
    }
    if report.transaction_status == "success" {
        return TxStatus::Success;
    }
    TxStatus::Pending
}

fn resolved_response(jar: SignedCookieJar, tx: &StoredTransaction) -> Response {
    match tx.status {
        TxStatus::Failed => {
            // The session cookie is left to expire on its own; only a
            // confirmed success clears it.
            let body = VerifyFailureResponse {
                success: false,
                error: "Transaction verification failed".to_string(),
            };
            (jar, (StatusCode::BAD_REQUEST, Json(body))).into_response()
        }
        status => {
            // A pending outcome keeps the session alive so the client can
            // retry verification once the transfer settles.
            let jar = if status == TxStatus::Success {
                session::clear_payment_session(jar)
            } else {
                jar
            };
            let body = VerifyPaymentResponse {
                success: true,
                transaction: VerifiedTransaction {
                    status,
                    transaction_hash: tx.transaction_hash.clone(),
                    token: tx.token_symbol.clone(),
                    amount: tx.token_amount,
                    from: tx.sender_wallet_address.clone(),
                    to: tx.recipient_address.clone(),
                    timestamp: tx.updated_at.to_rfc3339(),
                },
            };
            (jar, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(reference: &str, status: &str) -> PortalTransaction {
        PortalTransaction {
            reference: reference.to_string(),
            transaction_status: status.to_string(),
            transaction_hash: None,
            token: None,
            token_amount: None,
            from: None,
            to: None,
            timestamp: None,
        }
    }

    #[test]
    fn matching_reference_and_settled_status_is_success() {
        assert_eq!(
            evaluate_report(&report("ref-1", "success"), "ref-1"),
            TxStatus::Success
        );
        // An unknown non-failed status is treated as still settling.
        assert_eq!(
            evaluate_report(&report("ref-1", "submitted"), "ref-1"),
            TxStatus::Pending
        );
    }

    #[test]
    fn reference_mismatch_fails_verification() {
        assert_eq!(
            evaluate_report(&report("ref-other", "success"), "ref-1"),
            TxStatus::Failed
        );
    }

    #[test]
    fn failed_portal_status_fails_verification() {
        assert_eq!(
            evaluate_report(&report("ref-1", "failed"), "ref-1"),
            TxStatus::Failed
        );
    }

    #[test]
    fn still_settling_transfer_stays_pending() {
        assert_eq!(
            evaluate_report(&report("ref-1", "pending"), "ref-1"),
            TxStatus::Pending
        );
    }
}
