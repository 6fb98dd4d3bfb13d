// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! User directory: wallet-address-keyed identity records.
//!
//! Users are stored by ID with a secondary index file per wallet address.
//! The index entry is created with `create_new`, so the filesystem enforces
//! the one-user-per-wallet invariant even when two authentication requests
//! race through find-or-create for the same unseen address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::WalletAddress;

use super::super::{RecordStore, StoreError, StoreResult};

/// Placeholder name assigned at creation. A user whose name still equals
/// this sentinel has not completed onboarding.
pub const NEW_USER_SENTINEL: &str = "New User";

/// Stored user profile/KYC record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredUser {
    /// Server-assigned unique identifier.
    pub id: String,
    /// Wallet address as presented at first authentication (natural key,
    /// compared case-insensitively).
    pub wallet_address: String,
    /// Display name; starts as the [`NEW_USER_SENTINEL`] placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact mobile number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    /// Aadhaar number (KYC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
    /// PAN number (KYC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Create a placeholder record for a previously-unseen wallet.
    pub fn new_placeholder(wallet_address: &WalletAddress) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            wallet_address: wallet_address.0.clone(),
            full_name: Some(NEW_USER_SENTINEL.to_string()),
            email: None,
            mobile_number: None,
            aadhaar_number: None,
            pan_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the name still equals the creation sentinel.
    pub fn is_new(&self) -> bool {
        self.full_name.as_deref() == Some(NEW_USER_SENTINEL)
    }

    /// Profile completeness: name set and not the sentinel, plus email,
    /// mobile, Aadhaar and PAN all present.
    pub fn is_profile_complete(&self) -> bool {
        let named = self
            .full_name
            .as_deref()
            .map(|name| !name.trim().is_empty() && name != NEW_USER_SENTINEL)
            .unwrap_or(false);

        named
            && field_set(&self.email)
            && field_set(&self.mobile_number)
            && field_set(&self.aadhaar_number)
            && field_set(&self.pan_number)
    }
}

fn field_set(field: &Option<String>) -> bool {
    field
        .as_deref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

/// Secondary index entry mapping a normalized wallet address to a user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WalletIndexEntry {
    user_id: String,
}

/// Repository for user directory operations.
pub struct UserRepository<'a> {
    store: &'a RecordStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StoreResult<StoredUser> {
        let path = self.store.paths().user(user_id);
        if !self.store.exists(&path) {
            return Err(StoreError::NotFound(format!("User {user_id}")));
        }
        self.store.read_json(path)
    }

    /// Look up a user by wallet address (case-insensitive).
    pub fn find_by_wallet(&self, address: &WalletAddress) -> StoreResult<Option<StoredUser>> {
        let index_path = self.store.paths().wallet_index(&address.normalized());
        if !self.store.exists(&index_path) {
            return Ok(None);
        }

        let entry: WalletIndexEntry = self.store.read_json(index_path)?;
        Ok(Some(self.get(&entry.user_id)?))
    }

    /// Find the user for `address`, creating a placeholder record when none
    /// exists.
    ///
    /// Two concurrent calls for the same unseen address may both miss the
    /// lookup; the atomic index creation arbitrates, and the loser re-fetches
    /// the winner's record instead of surfacing a duplicate-key error.
    pub fn find_or_create(&self, address: &WalletAddress) -> StoreResult<StoredUser> {
        if let Some(user) = self.find_by_wallet(address)? {
            return Ok(user);
        }

        let user = StoredUser::new_placeholder(address);
        self.store
            .write_json(self.store.paths().user(&user.id), &user)?;

        let entry = WalletIndexEntry {
            user_id: user.id.clone(),
        };
        let index_path = self.store.paths().wallet_index(&address.normalized());

        match self.store.create_json_new(&index_path, &entry) {
            Ok(()) => Ok(user),
            Err(StoreError::AlreadyExists(_)) => {
                // Lost the creation race: discard our orphan record and
                // return the winner's.
                let _ = self.store.delete(self.store.paths().user(&user.id));
                self.find_by_wallet(address)?.ok_or_else(|| {
                    StoreError::NotFound(format!("User for wallet {address}"))
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Persist an updated user record. Fails closed when the record is gone.
    pub fn update(&self, user: &StoredUser) -> StoreResult<()> {
        let path = self.store.paths().user(&user.id);
        if !self.store.exists(&path) {
            return Err(StoreError::NotFound(format!("User {}", user.id)));
        }
        self.store.write_json(path, user)
    }
}
