// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Conversion transaction records.
//!
//! Records are keyed by `reference_id`, the correlation key issued at
//! initiation and echoed back by the payment-status provider. Status is a
//! three-state machine: `pending` can move to `success` or `failed` exactly
//! once; terminal states absorb.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{RecordStore, StoreError, StoreResult};

/// Conversion transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Initiated locally; settlement not yet confirmed.
    #[default]
    Pending,
    /// Provider confirmed settlement.
    Success,
    /// Provider reported failure or the reference check failed.
    Failed,
}

impl TxStatus {
    /// Whether the status is terminal (`success` or `failed`).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

/// Stored conversion record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredTransaction {
    /// Server-assigned unique identifier.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Correlation key between the local payment session and the provider.
    pub reference_id: String,
    /// Wallet the tokens are sent from.
    pub sender_wallet_address: String,
    /// Platform deposit address the tokens are sent to.
    pub recipient_address: String,
    /// Token symbol (e.g. WLD, USDC).
    pub token_symbol: String,
    /// Token-denominated amount.
    pub token_amount: f64,
    /// Current status.
    pub status: TxStatus,
    /// On-chain hash, once the provider confirms settlement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the status was last updated.
    pub updated_at: DateTime<Utc>,
}

impl StoredTransaction {
    /// Create a new pending conversion record with a fresh reference ID.
    pub fn new_pending(
        user_id: String,
        sender_wallet_address: String,
        recipient_address: String,
        token_symbol: String,
        token_amount: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            reference_id: Uuid::new_v4().to_string(),
            sender_wallet_address,
            recipient_address,
            token_symbol,
            token_amount,
            status: TxStatus::Pending,
            transaction_hash: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for conversion record operations.
pub struct TransactionRepository<'a> {
    store: &'a RecordStore,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Store a new conversion record. The reference ID is the unique key.
    pub fn create(&self, tx: &StoredTransaction) -> StoreResult<()> {
        let path = self.store.paths().transaction(&tx.reference_id);
        self.store.create_json_new(path, tx)
    }

    /// Get a record by reference ID.
    pub fn get_by_reference(&self, reference_id: &str) -> StoreResult<StoredTransaction> {
        let path = self.store.paths().transaction(reference_id);
        if !self.store.exists(&path) {
            return Err(StoreError::NotFound(format!(
                "Transaction {reference_id}"
            )));
        }
        self.store.read_json(path)
    }

    /// Update the status of the record with `reference_id`.
    ///
    /// Fails closed when the record is missing, and rejects transitions out
    /// of a terminal state. `pending -> pending` re-writes are allowed (a
    /// verify attempt that found the provider still settling).
    pub fn update_status(
        &self,
        reference_id: &str,
        status: TxStatus,
        transaction_hash: Option<&str>,
    ) -> StoreResult<StoredTransaction> {
        let mut tx = self.get_by_reference(reference_id)?;

        if tx.status.is_terminal() && tx.status != status {
            return Err(StoreError::AlreadyExists(format!(
                "Transaction {reference_id} already resolved"
            )));
        }

        tx.status = status;
        if let Some(hash) = transaction_hash {
            tx.transaction_hash = Some(hash.to_string());
        }
        tx.updated_at = Utc::now();

        self.store
            .write_json(self.store.paths().transaction(reference_id), &tx)?;
        Ok(tx)
    }

    /// List a user's conversions, newest first.
    pub fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<StoredTransaction>> {
        let ids = self
            .store
            .list_files(self.store.paths().transactions_dir(), "json")?;

        let mut transactions = Vec::new();
        for id in ids {
            match self.get_by_reference(&id) {
                Ok(tx) if tx.user_id == user_id => transactions.push(tx),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(reference_id = %id, error = %e, "skipping unreadable transaction");
                }
            }
        }

        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorePaths;
    use std::collections::HashSet;

    fn test_store() -> (RecordStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = RecordStore::new(StorePaths::new(dir.path()));
        store.initialize().expect("failed to initialize store");
        (store, dir)
    }

    fn test_transaction() -> StoredTransaction {
        StoredTransaction::new_pending(
            "user-1".to_string(),
            "0xsender".to_string(),
            "0xplatform".to_string(),
            "WLD".to_string(),
            5.0,
        )
    }

    #[test]
    fn create_and_get_by_reference() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let tx = test_transaction();
        repo.create(&tx).unwrap();

        let fetched = repo.get_by_reference(&tx.reference_id).unwrap();
        assert_eq!(fetched.id, tx.id);
        assert_eq!(fetched.status, TxStatus::Pending);
        assert_eq!(fetched.transaction_hash, None);
    }

    #[test]
    fn duplicate_reference_is_rejected() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let tx = test_transaction();
        repo.create(&tx).unwrap();
        let err = repo.create(&tx).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn fresh_references_are_unique() {
        let references: HashSet<String> = (0..10_000)
            .map(|_| test_transaction().reference_id)
            .collect();
        assert_eq!(references.len(), 10_000);
    }

    #[test]
    fn pending_transitions_to_success_with_hash() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let tx = test_transaction();
        repo.create(&tx).unwrap();

        let updated = repo
            .update_status(&tx.reference_id, TxStatus::Success, Some("0xhash"))
            .unwrap();
        assert_eq!(updated.status, TxStatus::Success);
        assert_eq!(updated.transaction_hash.as_deref(), Some("0xhash"));
    }

    #[test]
    fn terminal_states_absorb() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let tx = test_transaction();
        repo.create(&tx).unwrap();
        repo.update_status(&tx.reference_id, TxStatus::Failed, None)
            .unwrap();

        let err = repo
            .update_status(&tx.reference_id, TxStatus::Success, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let stored = repo.get_by_reference(&tx.reference_id).unwrap();
        assert_eq!(stored.status, TxStatus::Failed);
    }

    #[test]
    fn update_missing_reference_fails_closed() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let err = repo
            .update_status("no-such-reference", TxStatus::Success, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_by_user_is_newest_first_and_scoped() {
        let (store, _dir) = test_store();
        let repo = TransactionRepository::new(&store);

        let mut older = test_transaction();
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        repo.create(&older).unwrap();

        let newer = test_transaction();
        repo.create(&newer).unwrap();

        let mut other = test_transaction();
        other.user_id = "user-2".to_string();
        repo.create(&other).unwrap();

        let list = repo.list_by_user("user-1").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].reference_id, newer.reference_id);
        assert_eq!(list[1].reference_id, older.reference_id);
    }
}
