// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Repository layer providing typed access to the record store.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the RecordStore for all file operations.

pub mod payment_methods;
pub mod transactions;
pub mod users;

pub use payment_methods::{MethodDetails, PaymentMethodRepository, StoredPaymentMethod};
pub use transactions::{StoredTransaction, TransactionRepository, TxStatus};
pub use users::{StoredUser, UserRepository, NEW_USER_SENTINEL};
