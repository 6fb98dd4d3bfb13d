// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::providers::TransactionStatusSource;
use crate::storage::RecordStore;

/// Shared application state.
///
/// The store and portal handles are optional by design: missing
/// configuration degrades the affected operations to explicit 503 responses
/// instead of failing startup or corrupting state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Option<Arc<RecordStore>>,
    portal: Option<Arc<dyn TransactionStatusSource>>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Option<RecordStore>,
        portal: Option<Arc<dyn TransactionStatusSource>>,
    ) -> Self {
        let cookie_key = cookie_key_from_secret(config.cookie_secret.as_deref());
        Self {
            config: Arc::new(config),
            store: store.map(Arc::new),
            portal,
            cookie_key,
        }
    }

    /// The record store, or 503 when unconfigured/unavailable.
    pub fn store(&self) -> Result<&RecordStore, ApiError> {
        self.store.as_deref().ok_or_else(|| {
            ApiError::service_unavailable("Record store is not available. Check DATA_DIR.")
        })
    }

    /// The payment-status source, or 503 when the portal is unconfigured.
    pub fn portal(&self) -> Result<&dyn TransactionStatusSource, ApiError> {
        self.portal.as_deref().ok_or_else(|| {
            ApiError::service_unavailable(
                "Payment verification is not configured. Set WORLD_APP_ID and DEV_PORTAL_API_KEY.",
            )
        })
    }

    /// The platform deposit address, or 503 when unconfigured.
    pub fn platform_recipient(&self) -> Result<&str, ApiError> {
        self.config
            .platform_recipient_address
            .as_deref()
            .ok_or_else(|| {
                ApiError::service_unavailable(
                    "Payment initiation is not configured. Set PLATFORM_RECIPIENT_ADDRESS.",
                )
            })
    }

    pub fn portal_configured(&self) -> bool {
        self.portal.is_some()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

fn cookie_key_from_secret(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => key,
            Err(_) => {
                warn!("COOKIE_SECRET must be at least 64 bytes; using an ephemeral key");
                Key::generate()
            }
        },
        None => {
            warn!("COOKIE_SECRET not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}
