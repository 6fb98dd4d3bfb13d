// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! External provider clients.

pub mod dev_portal;

pub use dev_portal::{DevPortalClient, PortalError, PortalTransaction, TransactionStatusSource};
