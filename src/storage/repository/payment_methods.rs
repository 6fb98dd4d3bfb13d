// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Withdrawal payment methods (bank transfer or UPI).
//!
//! The default flag is not stored on the method records. Each user has at
//! most one pointer file naming their default method; setting a new default
//! is a single atomic write, so "at most one default per user" holds even
//! with concurrent writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{RecordStore, StoreError, StoreResult};

/// Bank or UPI destination details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "method_type", rename_all = "lowercase")]
pub enum MethodDetails {
    /// Bank account transfer destination.
    Bank {
        bank_name: String,
        account_number: String,
        ifsc_code: String,
        account_holder_name: String,
    },
    /// UPI transfer destination.
    Upi {
        upi_id: String,
        upi_app: String,
        upi_mobile_number: String,
    },
}

/// Stored withdrawal payment method.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredPaymentMethod {
    /// Unique identifier.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Bank or UPI details.
    #[serde(flatten)]
    pub details: MethodDetails,
    /// When the method was added.
    pub created_at: DateTime<Utc>,
    /// When the method was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Per-user default-method pointer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DefaultPointer {
    method_id: String,
}

/// Repository for payment method operations.
pub struct PaymentMethodRepository<'a> {
    store: &'a RecordStore,
}

impl<'a> PaymentMethodRepository<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Add a payment method for a user.
    pub fn create(
        &self,
        user_id: &str,
        details: MethodDetails,
        is_default: bool,
    ) -> StoreResult<StoredPaymentMethod> {
        let now = Utc::now();
        let method = StoredPaymentMethod {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            details,
            created_at: now,
            updated_at: now,
        };

        self.store
            .write_json(self.store.paths().payment_method(&method.id), &method)?;

        if is_default {
            self.write_default_pointer(user_id, &method.id)?;
        }

        Ok(method)
    }

    /// Get a payment method by ID.
    pub fn get(&self, method_id: &str) -> StoreResult<StoredPaymentMethod> {
        let path = self.store.paths().payment_method(method_id);
        if !self.store.exists(&path) {
            return Err(StoreError::NotFound(format!("Payment method {method_id}")));
        }
        self.store.read_json(path)
    }

    /// Replace the details of an existing method.
    pub fn update_details(
        &self,
        method_id: &str,
        details: MethodDetails,
    ) -> StoreResult<StoredPaymentMethod> {
        let mut method = self.get(method_id)?;
        method.details = details;
        method.updated_at = Utc::now();
        self.store
            .write_json(self.store.paths().payment_method(method_id), &method)?;
        Ok(method)
    }

    /// Delete a method; clears the owner's default pointer if it pointed here.
    pub fn delete(&self, method_id: &str) -> StoreResult<()> {
        let method = self.get(method_id)?;
        self.store
            .delete(self.store.paths().payment_method(method_id))?;

        if self.default_method_id(&method.user_id)?.as_deref() == Some(method_id) {
            let _ = self
                .store
                .delete(self.store.paths().default_method(&method.user_id));
        }

        Ok(())
    }

    /// The user's current default method ID, if any. A dangling pointer
    /// (method deleted out from under it) reads as no default.
    pub fn default_method_id(&self, user_id: &str) -> StoreResult<Option<String>> {
        let path = self.store.paths().default_method(user_id);
        if !self.store.exists(&path) {
            return Ok(None);
        }

        let pointer: DefaultPointer = self.store.read_json(path)?;
        if self
            .store
            .exists(self.store.paths().payment_method(&pointer.method_id))
        {
            Ok(Some(pointer.method_id))
        } else {
            Ok(None)
        }
    }

    /// Mark `method_id` as the user's default. The pointer write is atomic,
    /// so exclusivity cannot be violated by racing callers.
    pub fn set_default(&self, method_id: &str, user_id: &str) -> StoreResult<()> {
        let method = self.get(method_id)?;
        if method.user_id != user_id {
            return Err(StoreError::NotFound(format!(
                "Payment method {method_id} for user {user_id}"
            )));
        }
        self.write_default_pointer(user_id, method_id)
    }

    /// List a user's methods, default first, then newest first.
    pub fn list_by_user(
        &self,
        user_id: &str,
    ) -> StoreResult<Vec<(StoredPaymentMethod, bool)>> {
        let default_id = self.default_method_id(user_id)?;
        let ids = self
            .store
            .list_files(self.store.paths().payment_methods_dir(), "json")?;

        let mut methods = Vec::new();
        for id in ids {
            match self.get(&id) {
                Ok(method) if method.user_id == user_id => {
                    let is_default = default_id.as_deref() == Some(method.id.as_str());
                    methods.push((method, is_default));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(method_id = %id, error = %e, "skipping unreadable payment method");
                }
            }
        }

        methods.sort_by(|(a, a_default), (b, b_default)| {
            b_default
                .cmp(a_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(methods)
    }

    fn write_default_pointer(&self, user_id: &str, method_id: &str) -> StoreResult<()> {
        self.store.write_json(
            self.store.paths().default_method(user_id),
            &DefaultPointer {
                method_id: method_id.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorePaths;

    fn test_store() -> (RecordStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = RecordStore::new(StorePaths::new(dir.path()));
        store.initialize().expect("failed to initialize store");
        (store, dir)
    }

    fn bank_details() -> MethodDetails {
        MethodDetails::Bank {
            bank_name: "State Bank".to_string(),
            account_number: "000111222333".to_string(),
            ifsc_code: "SBIN0001234".to_string(),
            account_holder_name: "Asha Rao".to_string(),
        }
    }

    fn upi_details() -> MethodDetails {
        MethodDetails::Upi {
            upi_id: "asha@upi".to_string(),
            upi_app: "gpay".to_string(),
            upi_mobile_number: "+911234567890".to_string(),
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        let created = repo.create("user-1", bank_details(), false).unwrap();
        let fetched = repo.get(&created.id).unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.details, bank_details());
        assert_eq!(repo.default_method_id("user-1").unwrap(), None);
    }

    #[test]
    fn at_most_one_default_per_user() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        let bank = repo.create("user-1", bank_details(), true).unwrap();
        let upi = repo.create("user-1", upi_details(), false).unwrap();

        repo.set_default(&upi.id, "user-1").unwrap();

        let methods = repo.list_by_user("user-1").unwrap();
        let defaults: Vec<_> = methods
            .iter()
            .filter(|(_, is_default)| *is_default)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].0.id, upi.id);

        // Flip back and re-check exclusivity.
        repo.set_default(&bank.id, "user-1").unwrap();
        let methods = repo.list_by_user("user-1").unwrap();
        let defaults: Vec<_> = methods
            .iter()
            .filter(|(_, is_default)| *is_default)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].0.id, bank.id);
    }

    #[test]
    fn default_sorts_first_in_listing() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        let _bank = repo.create("user-1", bank_details(), false).unwrap();
        let upi = repo.create("user-1", upi_details(), true).unwrap();

        let methods = repo.list_by_user("user-1").unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].0.id, upi.id);
        assert!(methods[0].1);
    }

    #[test]
    fn set_default_rejects_foreign_method() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        let method = repo.create("user-1", upi_details(), false).unwrap();
        let err = repo.set_default(&method.id, "user-2").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_clears_default_pointer() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        let method = repo.create("user-1", bank_details(), true).unwrap();
        assert_eq!(
            repo.default_method_id("user-1").unwrap(),
            Some(method.id.clone())
        );

        repo.delete(&method.id).unwrap();
        assert_eq!(repo.default_method_id("user-1").unwrap(), None);
        assert!(matches!(
            repo.get(&method.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn listing_excludes_other_users() {
        let (store, _dir) = test_store();
        let repo = PaymentMethodRepository::new(&store);

        repo.create("user-1", bank_details(), false).unwrap();
        repo.create("user-2", upi_details(), true).unwrap();

        let methods = repo.list_by_user("user-1").unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].0.user_id, "user-1");
    }
}
