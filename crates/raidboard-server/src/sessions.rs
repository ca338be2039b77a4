//! Login sessions.
//!
//! Bearer tokens (uuid v4) mapped to account names, held in memory behind a
//! `tokio::sync::RwLock`. Sessions expire after a configurable TTL (7 days
//! by default, matching the board's login cookie lifetime); expired entries
//! are ignored on lookup and periodically purged by a background task.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    name: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Issues and resolves login tokens.
#[derive(Clone)]
pub struct SessionProvider {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionProvider {
    /// Provider with the given session lifetime in days.
    pub fn new(ttl_days: i64) -> Self {
        Self::with_ttl(Duration::days(ttl_days))
    }

    /// Provider with an explicit lifetime; used by tests.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a session for `name`; returns the token and its expiry.
    pub async fn login(&self, name: &str) -> (Uuid, DateTime<Utc>) {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token,
            Session {
                name: name.to_string(),
                expires_at,
            },
        );

        (token, expires_at)
    }

    /// Resolve a token to the logged-in account name, if still valid.
    pub async fn current_user(&self, token: Uuid) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&token)
            .filter(|s| s.is_fresh())
            .map(|s| s.name.clone())
    }

    /// Close a session. Returns `true` if the token was known.
    pub async fn logout(&self, token: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&token).is_some()
    }

    /// Evict expired sessions.
    pub async fn purge_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_fresh());
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
    }
}
