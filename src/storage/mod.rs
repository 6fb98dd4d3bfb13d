// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! # Record Store Module
//!
//! Persistent storage for users, payment methods, and conversion records.
//! Records are JSON files under `DATA_DIR`; see [`StorePaths`] for the
//! layout. Unique natural keys (wallet address, reference ID) are enforced
//! by atomic `create_new` file creation, which also arbitrates concurrent
//! find-or-create races.

pub mod fs;
pub mod paths;
pub mod repository;

pub use fs::{RecordStore, StoreError, StoreResult};
pub use paths::StorePaths;
pub use repository::{
    MethodDetails, PaymentMethodRepository, StoredPaymentMethod, StoredTransaction, StoredUser,
    TransactionRepository, TxStatus, UserRepository, NEW_USER_SENTINEL,
};
