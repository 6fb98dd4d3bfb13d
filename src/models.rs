// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! # Shared Domain Types
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters). Addresses arrive from clients in mixed case; equality
//! and store keys use the normalized lowercase form so one wallet maps to
//! exactly one user.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes). The inner
/// string keeps the caller's casing; use [`WalletAddress::normalized`] for
/// lookups and comparisons.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Lowercase form used as the store's natural key.
    pub fn normalized(&self) -> String {
        self.0.trim().to_ascii_lowercase()
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}
