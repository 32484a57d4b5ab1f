// SPDX-License-Identifier: MIT

//! Cookie-keyed server-side session store.
//!
//! Each session is an opaque key-value record; this backend only
//! promises get/set of values under string keys. Sessions carry a
//! creation timestamp and expire after [`SESSION_TTL_SECS`], matching
//! the cookie's max-age, so the store stays bounded: expired entries
//! are dropped on access and swept whenever a new session is minted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;

/// Name of the cookie carrying the session ID.
pub const SESSION_COOKIE: &str = "tubescope_session";

/// Server-side session lifetime, also used for the cookie max-age.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Opaque per-session key-value record.
pub type SessionRecord = HashMap<String, Value>;

/// A stored session with its creation time.
struct SessionEntry {
    created_at: DateTime<Utc>,
    record: SessionRecord,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(SESSION_TTL_SECS)
    }
}

/// In-memory session store keyed by random session IDs.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    rng: SystemRandom,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
        }
    }

    /// Create a new empty session and return its ID.
    ///
    /// Minting a session also sweeps out every expired one, so the
    /// store's size is bounded by the number of live sessions.
    pub fn create(&self) -> Result<String, AppError> {
        self.reap_expired();

        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session ID generation failed")))?;

        let session_id = URL_SAFE_NO_PAD.encode(bytes);
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                created_at: Utc::now(),
                record: SessionRecord::new(),
            },
        );
        Ok(session_id)
    }

    /// Read one value from a session. `None` when the session does not
    /// exist, has expired, or holds nothing under `key`.
    pub fn get(&self, session_id: &str, key: &str) -> Option<Value> {
        let now = Utc::now();
        let expired = match self.sessions.get(session_id) {
            Some(entry) if !entry.is_expired(now) => {
                return entry.record.get(key).cloned();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(session_id);
        }
        None
    }

    /// Write one value into a session, overwriting any previous value.
    /// Unknown or expired session IDs are ignored; the caller's session
    /// is gone and a new login will mint a fresh one.
    pub fn put(&self, session_id: &str, key: &str, value: Value) {
        let now = Utc::now();
        let expired = match self.sessions.get_mut(session_id) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.record.insert(key.to_string(), value);
                return;
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(session_id);
        }
    }

    /// Whether a live (non-expired) session with this ID exists.
    pub fn exists(&self, session_id: &str) -> bool {
        let now = Utc::now();
        self.sessions
            .get(session_id)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Destroy a session and everything in it.
    pub fn destroy(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Number of resident sessions, live or not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every expired session.
    fn reap_expired(&self) {
        let now = Utc::now();
        self.sessions.retain(|_, entry| !entry.is_expired(now));
    }

    /// Test hook: backdate a session's creation time.
    #[cfg(test)]
    fn backdate(&self, session_id: &str, created_at: DateTime<Utc>) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            entry.created_at = created_at;
        }
    }
}
