// SPDX-License-Identifier: MIT

//! Server-side session store.
//!
//! The client holds one cookie whose value is `token.signature`, where
//! the signature is hex-encoded HMAC-SHA256 of the token. The principal
//! itself lives server-side in a map keyed by the token, so a forged or
//! tampered cookie never reaches the lookup.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::models::Principal;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "companion_session";

/// Default session lifetime.
const SESSION_TTL_DAYS: i64 = 7;

struct SessionEntry {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

/// In-memory session store shared across request handlers.
pub struct SessionStore {
    secret: Vec<u8>,
    ttl: Duration,
    sessions: DashMap<String, SessionEntry>,
}

impl SessionStore {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            ttl: Duration::days(SESSION_TTL_DAYS),
            sessions: DashMap::new(),
        }
    }

    /// Create a session for a freshly authenticated principal.
    ///
    /// Returns the signed cookie value to hand to the client.
    pub fn insert(&self, principal: Principal) -> String {
        let mut token_bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut token_bytes);
        let token = hex::encode(token_bytes);

        self.sessions.insert(
            token.clone(),
            SessionEntry {
                principal,
                expires_at: Utc::now() + self.ttl,
            },
        );

        format!("{}.{}", token, self.sign(&token))
    }

    /// Resolve a cookie value to its principal.
    ///
    /// Returns None for a malformed value, a bad signature, an unknown
    /// token, or an expired session (which is dropped on the spot).
    pub fn get(&self, cookie_value: &str) -> Option<Principal> {
        let token = self.verify(cookie_value)?;

        if let Some(entry) = self.sessions.get(&token) {
            if entry.expires_at > Utc::now() {
                return Some(entry.principal.clone());
            }
        } else {
            return None;
        }

        // Expired: remove outside the read guard.
        self.sessions.remove(&token);
        None
    }

    /// Destroy the session behind a cookie value, if any.
    pub fn remove(&self, cookie_value: &str) {
        if let Some(token) = self.verify(cookie_value) {
            self.sessions.remove(&token);
        }
    }

    fn sign(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check the signature and return the bare token on success.
    fn verify(&self, cookie_value: &str) -> Option<String> {
        let (token, signature_hex) = cookie_value.split_once('.')?;
        let provided = hex::decode(signature_hex).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(token.as_bytes());
        let expected = mac.finalize().into_bytes();

        if expected.ct_eq(provided.as_slice()).into() {
            Some(token.to_string())
        } else {
            None
        }
    }
}
