// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Conversion history endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    state::AppState,
    storage::{StoredTransaction, TransactionRepository, UserRepository},
};

use super::store_error;

/// List response for a user's conversions, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionListResponse {
    pub transactions: Vec<StoredTransaction>,
    pub total: usize,
}

/// List a user's conversions.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/transactions",
    tag = "Transactions",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Conversion history", body = TransactionListResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let store = state.store()?;

    UserRepository::new(store)
        .get(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;

    let transactions = TransactionRepository::new(store)
        .list_by_user(&user_id)
        .map_err(|e| store_error(e, "User not found"))?;
    let total = transactions.len();

    Ok(Json(TransactionListResponse {
        transactions,
        total,
    }))
}
