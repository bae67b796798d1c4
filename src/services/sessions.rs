// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory session store.
//!
//! Each signed-in browser gets an opaque random id (carried inside the
//! session cookie JWT) that maps to its [`Session`]. Entries expire after the
//! configured TTL and are evicted lazily on load or by [`SessionStore::purge_expired`].

use crate::error::AppError;
use crate::models::Session;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    expires_at: Instant,
}

/// Shared session map, cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<DashMap<String, StoredSession>>,
    ttl: Duration,
    rng: SystemRandom,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            rng: SystemRandom::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `session` under a fresh random id and return the id.
    pub fn create(&self, session: Session) -> Result<String, AppError> {
        let id = random_id(&self.rng, SESSION_ID_BYTES)?;

        self.entries.insert(
            id.clone(),
            StoredSession {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );
        tracing::debug!(sessions = self.entries.len(), "Session created");
        Ok(id)
    }

    /// Current session for `id`, if it exists and has not expired.
    pub fn load(&self, id: &str) -> Option<Session> {
        let now = Instant::now();
        let session = {
            let entry = self.entries.get(id)?;
            if entry.expires_at <= now {
                None
            } else {
                Some(entry.session.clone())
            }
        };

        if session.is_none() {
            self.entries.remove(id);
            tracing::debug!("Expired session evicted");
        }
        session
    }

    /// Overwrite the session stored under `id`. Expiry is unchanged.
    ///
    /// Returns false if the id is unknown (e.g. logged out concurrently).
    pub fn save(&self, id: &str, session: Session) -> bool {
        match self.entries.get_mut(id) {
            Some(mut entry) => {
                entry.session = session;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// URL-safe random identifier built from `len` random bytes.
pub fn random_id(rng: &SystemRandom, len: usize) -> Result<String, AppError> {
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate random id")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Session {
        Session {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            user: None,
        }
    }

    #[test]
    fn test_create_and_load() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(signed_in()).unwrap();
        assert_eq!(id.len(), 43);

        let session = store.load(&id).unwrap();
        assert_eq!(session.access_token.as_deref(), Some("access"));
        assert!(store.load("unknown").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(Session::default()).unwrap();
        let b = store.create(Session::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_save_overwrites() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(signed_in()).unwrap();

        let mut session = store.load(&id).unwrap();
        session.access_token = Some("rotated".to_string());
        assert!(store.save(&id, session));
        assert_eq!(
            store.load(&id).unwrap().access_token.as_deref(),
            Some("rotated")
        );

        store.remove(&id);
        assert!(!store.save(&id, Session::default()));
    }

    #[test]
    fn test_expired_sessions_are_evicted() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create(signed_in()).unwrap();
        assert!(store.load(&id).is_none());
        assert!(store.is_empty());

        store.create(signed_in()).unwrap();
        store.create(signed_in()).unwrap();
        assert_eq!(store.purge_expired(), 2);
    }
}
