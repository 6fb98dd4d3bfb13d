// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! # Authentication Module
//!
//! SIWE (Sign-In-With-Ethereum) wallet authentication for the mini app.
//!
//! ## Auth Flow
//!
//! 1. Client fetches a one-time nonce (`GET /v1/auth/nonce`); the server
//!    binds it to a signed, short-lived session cookie.
//! 2. The wallet signs an EIP-4361 message embedding that nonce.
//! 3. Client posts the signed payload (`POST /v1/auth/complete`); the server
//!    checks cookie nonce equality, parses the message, verifies the
//!    EIP-191 signature recovers the claimed address, then resolves the
//!    address to a user record.
//!
//! ## Security
//!
//! - The nonce cookie is single-use: cleared as soon as a signature
//!   verifies, whatever the user-store outcome, so a captured payload
//!   cannot be replayed.
//! - Message expiration and not-before windows are honored when present.

pub mod siwe;

pub use siwe::{verify_wallet_auth, SiweError, SiweMessage, WalletAuthPayload};
