// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! EIP-4361 (SIWE) message parsing and EIP-191 signature verification.
//!
//! The wallet signs a plain-text message whose `Nonce:` field must match the
//! server-issued nonce. Verification recovers the signer address from the
//! `personal_sign` signature and compares it to the claimed address; there
//! is no remote call involved.

use alloy::primitives::Signature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const ACCOUNT_MARKER: &str = " wants you to sign in with your Ethereum account:";

/// Wallet-auth payload as delivered by the mini-app host.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletAuthPayload {
    /// Host-reported status of the wallet-auth command.
    pub status: String,
    /// The full EIP-4361 message text that was signed.
    pub message: String,
    /// Hex-encoded 65-byte `personal_sign` signature.
    pub signature: String,
    /// The address claimed by the wallet.
    pub address: String,
    /// Payload schema version.
    #[serde(default)]
    pub version: Option<u32>,
}

/// Errors from SIWE parsing or verification.
#[derive(Debug, thiserror::Error)]
pub enum SiweError {
    #[error("malformed SIWE message: {0}")]
    Malformed(String),

    #[error("message nonce does not match the issued nonce")]
    NonceMismatch,

    #[error("message has expired")]
    Expired,

    #[error("message is not yet valid")]
    NotYetValid,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("recovered signer does not match the claimed address")]
    AddressMismatch,
}

/// Parsed fields of an EIP-4361 message. Only the fields this service
/// checks are retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    /// Requesting domain (first line, before the account marker).
    pub domain: String,
    /// Address stated in the message body.
    pub address: String,
    /// One-time nonce embedded in the message.
    pub nonce: String,
    /// Optional expiration bound.
    pub expiration_time: Option<DateTime<Utc>>,
    /// Optional not-before bound.
    pub not_before: Option<DateTime<Utc>>,
}

impl SiweMessage {
    /// Parse the text form of an EIP-4361 message.
    pub fn parse(message: &str) -> Result<Self, SiweError> {
        let mut lines = message.lines();

        let first = lines
            .next()
            .ok_or_else(|| SiweError::Malformed("empty message".to_string()))?;
        let domain = first
            .strip_suffix(ACCOUNT_MARKER)
            .ok_or_else(|| SiweError::Malformed("missing account marker".to_string()))?
            .trim()
            .to_string();

        let address = lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| SiweError::Malformed("missing address line".to_string()))?
            .to_string();

        let mut nonce = None;
        let mut expiration_time = None;
        let mut not_before = None;

        for line in lines {
            if let Some(value) = line.strip_prefix("Nonce: ") {
                nonce = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Expiration Time: ") {
                expiration_time = Some(parse_timestamp(value)?);
            } else if let Some(value) = line.strip_prefix("Not Before: ") {
                not_before = Some(parse_timestamp(value)?);
            }
        }

        let nonce = nonce
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SiweError::Malformed("missing Nonce field".to_string()))?;

        Ok(Self {
            domain,
            address,
            nonce,
            expiration_time,
            not_before,
        })
    }

    /// Check the message's validity window against `now`.
    pub fn check_time_window(&self, now: DateTime<Utc>) -> Result<(), SiweError> {
        if let Some(expiration) = self.expiration_time {
            if now >= expiration {
                return Err(SiweError::Expired);
            }
        }
        if let Some(not_before) = self.not_before {
            if now < not_before {
                return Err(SiweError::NotYetValid);
            }
        }
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, SiweError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| SiweError::Malformed(format!("bad timestamp `{}`: {e}", value.trim())))
}

/// Verify a wallet-auth payload against the server-issued nonce.
///
/// Checks, in order: message shape, nonce equality, validity window,
/// message/claimed address agreement, and EIP-191 signature recovery.
pub fn verify_wallet_auth(
    payload: &WalletAuthPayload,
    expected_nonce: &str,
    now: DateTime<Utc>,
) -> Result<SiweMessage, SiweError> {
    let message = SiweMessage::parse(&payload.message)?;

    if message.nonce != expected_nonce {
        return Err(SiweError::NonceMismatch);
    }

    message.check_time_window(now)?;

    if !message.address.eq_ignore_ascii_case(&payload.address) {
        return Err(SiweError::AddressMismatch);
    }

    let signature_bytes = alloy::hex::decode(&payload.signature)
        .map_err(|e| SiweError::InvalidSignature(format!("bad hex: {e}")))?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|e| SiweError::InvalidSignature(e.to_string()))?;

    let recovered = signature
        .recover_address_from_msg(payload.message.as_bytes())
        .map_err(|e| SiweError::InvalidSignature(e.to_string()))?;

    if !recovered
        .to_string()
        .eq_ignore_ascii_case(&payload.address)
    {
        return Err(SiweError::AddressMismatch);
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};
    use chrono::Duration;

    pub(crate) fn build_message(address: &str, nonce: &str, expiration: Option<DateTime<Utc>>) -> String {
        let mut message = format!(
            "worldramp.app wants you to sign in with your Ethereum account:\n\
             {address}\n\
             \n\
             Convert your tokens to fiat.\n\
             \n\
             URI: https://worldramp.app\n\
             Version: 1\n\
             Chain ID: 480\n\
             Nonce: {nonce}\n\
             Issued At: {}",
            Utc::now().to_rfc3339()
        );
        if let Some(expiration) = expiration {
            message.push_str(&format!("\nExpiration Time: {}", expiration.to_rfc3339()));
        }
        message
    }

    fn signed_payload(signer: &PrivateKeySigner, nonce: &str) -> WalletAuthPayload {
        let address = signer.address().to_string();
        let message = build_message(&address, nonce, Some(Utc::now() + Duration::hours(1)));
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();

        WalletAuthPayload {
            status: "success".to_string(),
            message,
            signature: alloy::hex::encode_prefixed(signature.as_bytes()),
            address,
            version: Some(2),
        }
    }

    #[test]
    fn parse_extracts_fields() {
        let message = build_message("0x0000000000000000000000000000000000000001", "abc123", None);
        let parsed = SiweMessage::parse(&message).unwrap();

        assert_eq!(parsed.domain, "worldramp.app");
        assert_eq!(
            parsed.address,
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(parsed.nonce, "abc123");
        assert_eq!(parsed.expiration_time, None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            SiweMessage::parse(""),
            Err(SiweError::Malformed(_))
        ));
        assert!(matches!(
            SiweMessage::parse("not a siwe message at all"),
            Err(SiweError::Malformed(_))
        ));

        let no_nonce = "worldramp.app wants you to sign in with your Ethereum account:\n0xabc\n\nURI: x";
        assert!(matches!(
            SiweMessage::parse(no_nonce),
            Err(SiweError::Malformed(_))
        ));
    }

    #[test]
    fn valid_signature_verifies() {
        let signer = PrivateKeySigner::random();
        let payload = signed_payload(&signer, "nonce123");

        let message = verify_wallet_auth(&payload, "nonce123", Utc::now()).unwrap();
        assert_eq!(message.nonce, "nonce123");
    }

    #[test]
    fn nonce_mismatch_is_rejected() {
        let signer = PrivateKeySigner::random();
        let payload = signed_payload(&signer, "nonce123");

        let err = verify_wallet_auth(&payload, "other-nonce", Utc::now()).unwrap_err();
        assert!(matches!(err, SiweError::NonceMismatch));
    }

    #[test]
    fn expired_message_is_rejected() {
        let signer = PrivateKeySigner::random();
        let address = signer.address().to_string();
        let message = build_message(&address, "nonce123", Some(Utc::now() - Duration::minutes(1)));
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        let payload = WalletAuthPayload {
            status: "success".to_string(),
            message,
            signature: alloy::hex::encode_prefixed(signature.as_bytes()),
            address,
            version: Some(2),
        };

        let err = verify_wallet_auth(&payload, "nonce123", Utc::now()).unwrap_err();
        assert!(matches!(err, SiweError::Expired));
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let signer = PrivateKeySigner::random();
        let impostor = PrivateKeySigner::random();

        let address = signer.address().to_string();
        let message = build_message(&address, "nonce123", Some(Utc::now() + Duration::hours(1)));
        // Signed by a different key than the claimed address.
        let signature = impostor.sign_message_sync(message.as_bytes()).unwrap();
        let payload = WalletAuthPayload {
            status: "success".to_string(),
            message,
            signature: alloy::hex::encode_prefixed(signature.as_bytes()),
            address,
            version: Some(2),
        };

        let err = verify_wallet_auth(&payload, "nonce123", Utc::now()).unwrap_err();
        assert!(matches!(err, SiweError::AddressMismatch));
    }

    #[test]
    fn tampered_message_is_rejected() {
        let signer = PrivateKeySigner::random();
        let mut payload = signed_payload(&signer, "nonce123");
        payload.message = payload.message.replace("Convert", "Steal");

        let err = verify_wallet_auth(&payload, "nonce123", Utc::now()).unwrap_err();
        assert!(matches!(err, SiweError::AddressMismatch));
    }
}
