// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Worldramp

//! Cookie-carried session state.
//!
//! Both handshakes in this service are stateless on the server: the nonce
//! issued for wallet auth and the payment session issued at initiation live
//! entirely in signed, http-only cookies held by the client. The signing key
//! comes from `COOKIE_SECRET`; tampered cookies simply fail to read.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

/// Name of the one-time wallet-auth nonce cookie.
pub const NONCE_COOKIE: &str = "siwe_nonce";

/// Name of the payment-session cookie set at initiation.
pub const PAYMENT_COOKIE: &str = "payment_session";

/// Nonce cookie lifetime.
pub const NONCE_TTL: Duration = Duration::minutes(10);

/// Payment-session cookie lifetime.
pub const PAYMENT_TTL: Duration = Duration::hours(1);

/// Generate a fresh opaque nonce: a v4 UUID with separators stripped
/// (32 alphanumeric characters).
pub fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Payment session bound to a conversion attempt. Stored as JSON in the
/// signed payment cookie and used at verification to recover the reference
/// without the client resending the fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSession {
    /// Locally issued correlation key.
    pub reference_id: String,
    /// Token-denominated amount.
    pub amount: f64,
    /// Token symbol.
    pub token: String,
    /// Sender wallet address.
    pub wallet: String,
    /// Unix millis at initiation.
    pub timestamp: i64,
}

fn session_cookie(name: &'static str, value: String, ttl: Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(ttl);
    cookie
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}

/// Build the nonce cookie for a fresh authentication attempt.
pub fn nonce_cookie(nonce: &str) -> Cookie<'static> {
    session_cookie(NONCE_COOKIE, nonce.to_string(), NONCE_TTL)
}

/// Read the nonce currently bound to the session, if any.
pub fn stored_nonce(jar: &SignedCookieJar) -> Option<String> {
    jar.get(NONCE_COOKIE).map(|c| c.value().to_string())
}

/// Expire the nonce cookie (single-use enforcement).
pub fn clear_nonce(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(removal_cookie(NONCE_COOKIE))
}

/// Build the payment-session cookie for an initiated conversion.
pub fn payment_cookie(session: &PaymentSession) -> Result<Cookie<'static>, serde_json::Error> {
    let value = serde_json::to_string(session)?;
    Ok(session_cookie(PAYMENT_COOKIE, value, PAYMENT_TTL))
}

/// Read and parse the payment session, if present and well-formed.
pub fn stored_payment_session(jar: &SignedCookieJar) -> Option<PaymentSession> {
    jar.get(PAYMENT_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
}

/// Expire the payment-session cookie after a confirmed verification.
pub fn clear_payment_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(removal_cookie(PAYMENT_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    #[test]
    fn nonce_is_long_and_alphanumeric() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_nonce());
    }

    #[test]
    fn session_cookies_are_locked_down() {
        let cookie = nonce_cookie("abc");
        assert_eq!(cookie.name(), NONCE_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(NONCE_TTL));
    }

    #[test]
    fn payment_session_round_trips_through_jar() {
        let session = PaymentSession {
            reference_id: "ref-1".to_string(),
            amount: 5.0,
            token: "WLD".to_string(),
            wallet: "0xabc".to_string(),
            timestamp: 1_760_000_000_000,
        };

        let jar = SignedCookieJar::new(Key::generate());
        let jar = jar.add(payment_cookie(&session).unwrap());

        let parsed = stored_payment_session(&jar).expect("session should parse");
        assert_eq!(parsed, session);

        let jar = clear_payment_session(jar);
        assert!(stored_payment_session(&jar).is_none());
    }

    #[test]
    fn nonce_round_trips_through_jar() {
        let jar = SignedCookieJar::new(Key::generate());
        let nonce = generate_nonce();
        let jar = jar.add(nonce_cookie(&nonce));

        assert_eq!(stored_nonce(&jar), Some(nonce));

        let jar = clear_nonce(jar);
        assert_eq!(stored_nonce(&jar), None);
    }
}
