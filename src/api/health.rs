// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Record store availability.
    pub store: String,
    /// Developer Portal configuration state.
    pub portal: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_store(state: &AppState) -> String {
    match state.store() {
        Ok(store) => match store.health_check() {
            Ok(()) => "ok".to_string(),
            Err(_) => "unavailable".to_string(),
        },
        Err(_) => "unconfigured".to_string(),
    }
}

/// Health check endpoint handler.
///
/// Returns 200 when the record store probe passes, 503 otherwise. An
/// unconfigured portal is reported but does not fail readiness; payment
/// verification degrades to 503 on its own endpoints.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store = check_store(&state);
    let portal = if state.portal_configured() {
        "ok".to_string()
    } else {
        "unconfigured".to_string()
    };

    let store_ok = store == "ok";
    let response = ReadyResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            store,
            portal,
        },
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use /health for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
