//! Persisted login state.
//!
//! The client works without any of this; a [`SessionHook`] only lets a
//! front end keep its tokens between runs.

use std::path::PathBuf;
use std::sync::Mutex;

use blackfang_core::wire::TokenPair;
use blackfang_core::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    #[must_use]
    pub fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
            expires_at: tokens.expires_at,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub(crate) fn replace_tokens(&mut self, tokens: TokenPair) {
        self.access_token = tokens.access_token;
        self.refresh_token = tokens.refresh_token;
        self.expires_at = tokens.expires_at;
    }
}

/// Where a client keeps its session between runs.
pub trait SessionHook: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClientError::SessionStore`] if stored state cannot be read.
    fn load(&self) -> Result<Option<StoredSession>, ClientError>;

    /// # Errors
    ///
    /// Returns [`ClientError::SessionStore`] if the session cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), ClientError>;

    /// # Errors
    ///
    /// Returns [`ClientError::SessionStore`] if stored state cannot be removed.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Keeps the session for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemorySessionHook {
    slot: Mutex<Option<StoredSession>>,
}

impl SessionHook for MemorySessionHook {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.lock()? = None;
        Ok(())
    }
}

impl MemorySessionHook {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredSession>>, ClientError> {
        self.slot
            .lock()
            .map_err(|_| ClientError::SessionStore("session lock poisoned".to_string()))
    }
}

/// Stores the session as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionHook {
    path: PathBuf,
}

impl FileSessionHook {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionHook for FileSessionHook {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::SessionStore(e.to_string())),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ClientError::Deserialize {
                context: self.path.display().to_string(),
                source: e,
            })
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::SessionStore(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(session).map_err(|e| ClientError::Deserialize {
            context: "stored session".to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, raw).map_err(|e| ClientError::SessionStore(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::SessionStore(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn session() -> StoredSession {
        StoredSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user: User {
                id: 1,
                name: "Demo Automotive Dealership".to_string(),
                email: "demo@blackfangintel.com".to_string(),
                company_name: "Demo Motors Pvt Ltd".to_string(),
            },
            expires_at: Utc.with_ymd_and_hms(2025, 6, 10, 13, 0, 0).unwrap(),
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        let s = session();
        assert!(!s.is_expired(s.expires_at - chrono::Duration::seconds(1)));
        assert!(s.is_expired(s.expires_at));
    }

    #[test]
    fn file_hook_saves_loads_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let hook = FileSessionHook::new(dir.path().join("nested").join("session.json"));

        assert_eq!(hook.load().unwrap(), None);
        hook.save(&session()).unwrap();
        assert_eq!(hook.load().unwrap(), Some(session()));
        hook.clear().unwrap();
        assert_eq!(hook.load().unwrap(), None);
        hook.clear().unwrap();
    }

    #[test]
    fn memory_hook_round() {
        let hook = MemorySessionHook::default();
        hook.save(&session()).unwrap();
        assert_eq!(hook.load().unwrap().map(|s| s.user.id), Some(1));
        hook.clear().unwrap();
        assert!(hook.load().unwrap().is_none());
    }
}
