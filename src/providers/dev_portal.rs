// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Developer Portal client for payment-status lookups.
//!
//! After the client completes a transfer in the wallet host, the portal is
//! the authority on its status. The service queries it with the host-issued
//! transaction ID and cross-checks the returned `reference` against the
//! locally stored one before committing a status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::AppConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Transaction record as reported by the Developer Portal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalTransaction {
    /// The reference the client passed when initiating the transfer. Must
    /// match the locally issued reference ID.
    pub reference: String,
    /// Portal status: `success`, `pending`, or `failed`.
    pub transaction_status: String,
    /// On-chain hash, once mined.
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Token symbol of the transfer.
    #[serde(default)]
    pub token: Option<String>,
    /// Token amount of the transfer.
    #[serde(default)]
    pub token_amount: Option<String>,
    /// Sender address.
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient address.
    #[serde(default)]
    pub to: Option<String>,
    /// Portal-reported timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Errors from Developer Portal calls.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Developer Portal configuration missing: {0}")]
    MissingConfig(String),

    #[error("Developer Portal request failed: {0}")]
    Request(String),

    #[error("Developer Portal response was invalid: {0}")]
    InvalidResponse(String),
}

/// Source of externally reported transaction statuses.
///
/// The production implementation is [`DevPortalClient`]; tests substitute a
/// canned source.
#[async_trait]
pub trait TransactionStatusSource: Send + Sync {
    async fn fetch_transaction(&self, transaction_id: &str)
        -> Result<PortalTransaction, PortalError>;
}

/// HTTP client for the Developer Portal transaction API.
#[derive(Debug, Clone)]
pub struct DevPortalClient {
    api_base_url: String,
    app_id: String,
    api_key: String,
    http: Client,
}

impl DevPortalClient {
    /// Build a client from validated configuration. Fails when the app ID or
    /// credential is absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, PortalError> {
        let app_id = config
            .world_app_id
            .clone()
            .ok_or_else(|| PortalError::MissingConfig("WORLD_APP_ID".to_string()))?;
        let api_key = config
            .dev_portal_api_key
            .clone()
            .ok_or_else(|| PortalError::MissingConfig("DEV_PORTAL_API_KEY".to_string()))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortalError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: config.dev_portal_api_base_url.clone(),
            app_id,
            api_key,
            http,
        })
    }

    fn transaction_url(&self, transaction_id: &str) -> String {
        format!(
            "{}/api/v2/minikit/transaction/{}?app_id={}&type=payment",
            self.api_base_url.trim_end_matches('/'),
            transaction_id,
            self.app_id
        )
    }
}

#[async_trait]
impl TransactionStatusSource for DevPortalClient {
    async fn fetch_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<PortalTransaction, PortalError> {
        let url = self.transaction_url(transaction_id);
        debug!(transaction_id = %transaction_id, "fetching transaction status from portal");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| PortalError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::Request(format!(
                "portal returned {status}: {body}"
            )));
        }

        response
            .json::<PortalTransaction>()
            .await
            .map_err(|e| PortalError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DEV_PORTAL_API_BASE_URL;

    fn test_client() -> DevPortalClient {
        let config = AppConfig {
            data_dir: "/tmp".into(),
            world_app_id: Some("app_abc123".into()),
            dev_portal_api_key: Some("key".into()),
            dev_portal_api_base_url: DEFAULT_DEV_PORTAL_API_BASE_URL.into(),
            platform_recipient_address: None,
            cookie_secret: None,
        };
        DevPortalClient::from_config(&config).unwrap()
    }

    #[test]
    fn from_config_requires_credentials() {
        let config = AppConfig {
            data_dir: "/tmp".into(),
            world_app_id: None,
            dev_portal_api_key: None,
            dev_portal_api_base_url: DEFAULT_DEV_PORTAL_API_BASE_URL.into(),
            platform_recipient_address: None,
            cookie_secret: None,
        };
        let err = DevPortalClient::from_config(&config).unwrap_err();
        assert!(matches!(err, PortalError::MissingConfig(_)));
    }

    #[test]
    fn transaction_url_includes_app_and_type() {
        let client = test_client();
        assert_eq!(
            client.transaction_url("txn_1"),
            "https://developer.worldcoin.org/api/v2/minikit/transaction/txn_1?app_id=app_abc123&type=payment"
        );
    }

    #[test]
    fn portal_transaction_deserializes_sparse_payloads() {
        let json = r#"{"reference":"ref-1","transaction_status":"pending"}"#;
        let tx: PortalTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.reference, "ref-1");
        assert_eq!(tx.transaction_status, "pending");
        assert_eq!(tx.transaction_hash, None);

        let json = r#"{
            "reference": "ref-2",
            "transaction_status": "success",
            "transaction_hash": "0xhash",
            "token": "WLD",
            "token_amount": "5",
            "from": "0xsender",
            "to": "0xplatform",
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;
        let tx: PortalTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.transaction_hash.as_deref(), Some("0xhash"));
        assert_eq!(tx.token.as_deref(), Some("WLD"));
    }
}
