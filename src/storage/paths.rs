// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Path layout for the record store.
//!
//! ```text
//! {DATA_DIR}/
//!   users/
//!     {user_id}.json            # User profile/KYC record
//!     by-wallet/
//!       {wallet_address}.json   # Wallet index entry -> user_id (unique key)
//!   payment_methods/
//!     {method_id}.json          # Bank/UPI withdrawal method
//!     defaults/
//!       {user_id}.json          # Single default-method pointer per user
//!   transactions/
//!     {reference_id}.json       # Conversion record, keyed by reference
//! ```

use std::path::{Path, PathBuf};

/// Path utilities for the record store layout.
#[derive(Debug, Clone)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    /// Directory for the wallet-address index.
    pub fn wallet_index_dir(&self) -> PathBuf {
        self.users_dir().join("by-wallet")
    }

    /// Path to a wallet index entry. `wallet_key` must already be normalized
    /// (lowercase hex with `0x` prefix).
    pub fn wallet_index(&self, wallet_key: &str) -> PathBuf {
        self.wallet_index_dir().join(format!("{wallet_key}.json"))
    }

    // ========== Payment Method Paths ==========

    /// Directory containing all payment methods.
    pub fn payment_methods_dir(&self) -> PathBuf {
        self.root.join("payment_methods")
    }

    /// Path to a specific payment method record.
    pub fn payment_method(&self, method_id: &str) -> PathBuf {
        self.payment_methods_dir().join(format!("{method_id}.json"))
    }

    /// Directory of per-user default-method pointers.
    pub fn default_methods_dir(&self) -> PathBuf {
        self.payment_methods_dir().join("defaults")
    }

    /// Path to a user's default-method pointer.
    pub fn default_method(&self, user_id: &str) -> PathBuf {
        self.default_methods_dir().join(format!("{user_id}.json"))
    }

    // ========== Transaction Paths ==========

    /// Directory containing all conversion records.
    pub fn transactions_dir(&self) -> PathBuf {
        self.root.join("transactions")
    }

    /// Path to a conversion record, keyed by reference ID.
    pub fn transaction(&self, reference_id: &str) -> PathBuf {
        self.transactions_dir().join(format!("{reference_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_root() {
        let paths = StorePaths::new("/data");
        assert_eq!(paths.user("u1"), PathBuf::from("/data/users/u1.json"));
        assert_eq!(
            paths.wallet_index("0xabc"),
            PathBuf::from("/data/users/by-wallet/0xabc.json")
        );
        assert_eq!(
            paths.payment_method("pm1"),
            PathBuf::from("/data/payment_methods/pm1.json")
        );
        assert_eq!(
            paths.default_method("u1"),
            PathBuf::from("/data/payment_methods/defaults/u1.json")
        );
        assert_eq!(
            paths.transaction("ref1"),
            PathBuf::from("/data/transactions/ref1.json")
        );
    }
}
