//! Ephemeral operator notifications.
//!
//! The queue lives per screen mount. Transient entries are removed when
//! their expiry timer fires; sticky ones survive expiry and only leave via
//! an explicit dismissal. Ids keep counting across `clear` so a timer from
//! a previous screen can never remove a fresh entry.

use serde::{Deserialize, Serialize};

use crate::MAX_NOTIFICATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
    /// Low-emphasis styling, used for false-positive notices.
    Muted,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Muted => "muted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub sticky: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    /// Appends a notification and returns its id so the caller can schedule
    /// the expiry timer. A full queue evicts the oldest non-sticky entry
    /// first, then the oldest outright.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity, sticky: bool) -> u64 {
        if self.entries.len() >= MAX_NOTIFICATIONS {
            let victim = self
                .entries
                .iter()
                .position(|n| !n.sticky)
                .unwrap_or(0);
            self.entries.remove(victim);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
            sticky,
        });
        id
    }

    /// Explicit dismissal removes any entry, sticky or not.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Timer-driven removal. Sticky entries ignore expiry, and an id that
    /// was already dismissed is a no-op.
    pub fn expire(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id || n.sticky);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_entries_append() {
        let mut queue = NotificationQueue::default();
        let a = queue.push("first", Severity::Success, false);
        let b = queue.push("second", Severity::Error, true);
        assert!(b > a);
        let messages: Vec<&str> = queue.entries().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn expiry_removes_transient_but_not_sticky() {
        let mut queue = NotificationQueue::default();
        let transient = queue.push("going", Severity::Info, false);
        let sticky = queue.push("staying", Severity::Warning, true);

        assert!(queue.expire(transient));
        assert!(!queue.expire(sticky), "sticky survives its own expiry");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries()[0].id, sticky);
    }

    #[test]
    fn dismissal_removes_sticky_entries() {
        let mut queue = NotificationQueue::default();
        let sticky = queue.push("staying", Severity::Warning, true);
        assert!(queue.dismiss(sticky));
        assert!(queue.is_empty());
        assert!(!queue.dismiss(sticky), "second dismiss is a no-op");
    }

    #[test]
    fn expiring_a_dismissed_id_is_a_no_op() {
        let mut queue = NotificationQueue::default();
        let id = queue.push("gone", Severity::Success, false);
        assert!(queue.dismiss(id));
        assert!(!queue.expire(id));
    }

    #[test]
    fn cap_evicts_oldest_non_sticky_first() {
        let mut queue = NotificationQueue::default();
        let sticky = queue.push("keep", Severity::Warning, true);
        for i in 0..MAX_NOTIFICATIONS - 1 {
            queue.push(format!("n{i}"), Severity::Info, false);
        }
        assert_eq!(queue.len(), MAX_NOTIFICATIONS);

        queue.push("overflow", Severity::Info, false);
        assert_eq!(queue.len(), MAX_NOTIFICATIONS);
        assert!(queue.entries().iter().any(|n| n.id == sticky));
        assert!(!queue.entries().iter().any(|n| n.message == "n0"));
    }

    #[test]
    fn cap_on_all_sticky_queue_evicts_oldest() {
        let mut queue = NotificationQueue::default();
        for i in 0..MAX_NOTIFICATIONS {
            queue.push(format!("s{i}"), Severity::Warning, true);
        }
        queue.push("newest", Severity::Warning, true);
        assert_eq!(queue.len(), MAX_NOTIFICATIONS);
        assert!(!queue.entries().iter().any(|n| n.message == "s0"));
        assert!(queue.entries().iter().any(|n| n.message == "newest"));
    }

    #[test]
    fn clear_keeps_ids_unique_across_screen_changes() {
        let mut queue = NotificationQueue::default();
        let old = queue.push("old screen", Severity::Info, false);
        queue.clear();
        let fresh = queue.push("new screen", Severity::Info, false);
        assert!(fresh > old);
        assert!(!queue.expire(old), "stale timer cannot touch the new entry");
        assert_eq!(queue.len(), 1);
    }
}
