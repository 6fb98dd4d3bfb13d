// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! # Runtime Configuration
//!
//! This module defines environment variable names and the validated
//! [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the record store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `WORLD_APP_ID` | App identifier sent to the Developer Portal | Required for verification |
//! | `DEV_PORTAL_API_KEY` | Bearer credential for the Developer Portal | Required for verification |
//! | `DEV_PORTAL_API_BASE_URL` | Developer Portal base URL | `https://developer.worldcoin.org` |
//! | `PLATFORM_RECIPIENT_ADDRESS` | Deposit address for conversions | Required for initiation |
//! | `COOKIE_SECRET` | Session cookie signing key material (>= 64 bytes) | Random per-process key |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Missing portal or recipient configuration does not prevent startup; the
//! affected operations respond 503 instead (explicit unavailability rather
//! than silent corruption).

use std::env;

/// Environment variable name for the record store root directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the Developer Portal app identifier.
pub const WORLD_APP_ID_ENV: &str = "WORLD_APP_ID";

/// Environment variable name for the Developer Portal bearer credential.
pub const DEV_PORTAL_API_KEY_ENV: &str = "DEV_PORTAL_API_KEY";

/// Environment variable name for the Developer Portal base URL.
pub const DEV_PORTAL_API_BASE_URL_ENV: &str = "DEV_PORTAL_API_BASE_URL";

/// Environment variable name for the platform deposit address.
pub const PLATFORM_RECIPIENT_ADDRESS_ENV: &str = "PLATFORM_RECIPIENT_ADDRESS";

/// Environment variable name for the cookie signing secret.
pub const COOKIE_SECRET_ENV: &str = "COOKIE_SECRET";

/// Default record store root. Overridden by `DATA_DIR`.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Default Developer Portal base URL.
pub const DEFAULT_DEV_PORTAL_API_BASE_URL: &str = "https://developer.worldcoin.org";

/// Validated application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for the record store.
    pub data_dir: String,
    /// Developer Portal app identifier, if configured.
    pub world_app_id: Option<String>,
    /// Developer Portal bearer credential, if configured.
    pub dev_portal_api_key: Option<String>,
    /// Developer Portal base URL.
    pub dev_portal_api_base_url: String,
    /// Platform deposit address for conversions, if configured.
    pub platform_recipient_address: Option<String>,
    /// Cookie signing key material, if configured.
    pub cookie_secret: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            data_dir: env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR),
            world_app_id: env_non_empty(WORLD_APP_ID_ENV),
            dev_portal_api_key: env_non_empty(DEV_PORTAL_API_KEY_ENV),
            dev_portal_api_base_url: env_or_default(
                DEV_PORTAL_API_BASE_URL_ENV,
                DEFAULT_DEV_PORTAL_API_BASE_URL,
            ),
            platform_recipient_address: env_non_empty(PLATFORM_RECIPIENT_ADDRESS_ENV),
            cookie_secret: env_non_empty(COOKIE_SECRET_ENV),
        }
    }

    /// Whether the Developer Portal client can be constructed.
    pub fn portal_configured(&self) -> bool {
        self.world_app_id.is_some() && self.dev_portal_api_key.is_some()
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_configured_requires_both_credentials() {
        let mut config = AppConfig {
            data_dir: "/tmp".into(),
            world_app_id: Some("app_123".into()),
            dev_portal_api_key: None,
            dev_portal_api_base_url: DEFAULT_DEV_PORTAL_API_BASE_URL.into(),
            platform_recipient_address: None,
            cookie_secret: None,
        };
        assert!(!config.portal_configured());

        config.dev_portal_api_key = Some("key".into());
        assert!(config.portal_configured());
    }
}
