//! Bearer tokens issued by `/api/auth/login`.
//!
//! Access tokens expire after the configured session TTL; refresh tokens
//! live twice as long and are single-use.

use std::collections::HashMap;
use std::time::Duration;

use blackfang_core::wire::TokenPair;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Grant {
    user_id: i64,
    expires_at: DateTime<Utc>,
    /// The access token a refresh token was minted with.
    paired_access: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: chrono::Duration,
    access: HashMap<String, Grant>,
    refresh: HashMap<String, Grant>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1)),
            access: HashMap::new(),
            refresh: HashMap::new(),
        }
    }

    pub fn issue(&mut self, user_id: i64, now: DateTime<Utc>) -> TokenPair {
        let access_token = new_token();
        let refresh_token = new_token();
        let expires_at = expiry(now, self.ttl);

        self.access.insert(
            access_token.clone(),
            Grant {
                user_id,
                expires_at,
                paired_access: None,
            },
        );
        self.refresh.insert(
            refresh_token.clone(),
            Grant {
                user_id,
                expires_at: expiry(now, self.ttl.checked_mul(2).unwrap_or(self.ttl)),
                paired_access: Some(access_token.clone()),
            },
        );

        TokenPair {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// The user an unexpired access token belongs to.
    #[must_use]
    pub fn authenticate(&self, access_token: &str, now: DateTime<Utc>) -> Option<i64> {
        self.access
            .get(access_token)
            .filter(|g| g.expires_at > now)
            .map(|g| g.user_id)
    }

    /// Trade a refresh token for a new pair. The old pair stops working.
    pub fn rotate(&mut self, refresh_token: &str, now: DateTime<Utc>) -> Option<TokenPair> {
        let grant = self.refresh.remove(refresh_token)?;
        if let Some(access) = &grant.paired_access {
            self.access.remove(access);
        }
        if grant.expires_at <= now {
            return None;
        }
        Some(self.issue(grant.user_id, now))
    }

    /// Revoke an access token and the refresh token minted with it.
    pub fn revoke(&mut self, access_token: &str) -> bool {
        let removed = self.access.remove(access_token).is_some();
        self.refresh
            .retain(|_, g| g.paired_access.as_deref() != Some(access_token));
        removed
    }

    /// Drop every expired token. Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.access.len() + self.refresh.len();
        self.access.retain(|_, g| g.expires_at > now);
        self.refresh.retain(|_, g| g.expires_at > now);
        before - (self.access.len() + self.refresh.len())
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.access.len()
    }
}

/// `now + ttl`, pinned to the latest representable instant on overflow.
fn expiry(now: DateTime<Utc>, ttl: chrono::Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}
