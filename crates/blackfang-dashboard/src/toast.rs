//! Transient notifications shown over the dashboard.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct ToastQueue {
    ttl: Duration,
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            toasts: Vec::new(),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Queue a toast and return its id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let ttl = chrono::Duration::from_std(self.ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(3));
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
        id
    }

    /// Remove one toast. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast that has expired at `now`. Returns how many went.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired(now));
        before - self.toasts.len()
    }

    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |t| !t.is_expired(now))
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn toast_expires_after_ttl() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Success, "saved", t0());

        assert_eq!(queue.active(t0() + ChronoDuration::milliseconds(2_999)).count(), 1);
        assert_eq!(queue.active(t0() + ChronoDuration::seconds(3)).count(), 0);
    }

    #[test]
    fn huge_ttl_saturates_instead_of_overflowing() {
        let mut queue = ToastQueue::new(Duration::from_millis(10_000_000_000_000_000));
        queue.push(ToastKind::Info, "sticky", t0());

        let toast = queue.active(t0()).next().expect("toast queued");
        assert!(toast.expires_at > t0() + ChronoDuration::days(365));
    }

    #[test]
    fn ids_are_sequential() {
        let mut queue = ToastQueue::default();
        let a = queue.push(ToastKind::Info, "a", t0());
        let b = queue.push(ToastKind::Info, "b", t0());
        assert_eq!(b, a + 1);
    }

    #[test]
    fn dismiss_reports_whether_removed() {
        let mut queue = ToastQueue::default();
        let id = queue.push(ToastKind::Error, "boom", t0());
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert!(queue.is_empty());
    }

    #[test]
    fn prune_removes_only_expired() {
        let mut queue = ToastQueue::new(Duration::from_secs(3));
        queue.push(ToastKind::Info, "old", t0());
        queue.push(ToastKind::Info, "new", t0() + ChronoDuration::seconds(2));

        assert_eq!(queue.prune(t0() + ChronoDuration::seconds(4)), 1);
        assert_eq!(queue.len(), 1);
    }
}
