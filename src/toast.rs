//! Transient toast queue.
//!
//! Models the toast lifecycle explicitly so it is testable without a UI:
//! a toast is inserted in `Entering`, becomes `Visible` after a short enter
//! transition, starts `Leaving` once its 4-second lifetime elapses, and is
//! dropped from the queue when the exit transition completes. State advances
//! only in `tick`, which takes the clock as an argument.

use std::time::{Duration, Instant};

/// Enter transition before a toast counts as shown.
const ENTER: Duration = Duration::from_millis(20);
/// How long a toast stays visible.
const LIFETIME: Duration = Duration::from_secs(4);
/// Exit transition before removal.
const EXIT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Error => "❌",
            Severity::Info => "ℹ️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastState {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub state: ToastState,
    created: Instant,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a toast, stamped with the current time.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        self.push_at(severity, message, Instant::now())
    }

    /// Insert a toast with an explicit timestamp.
    pub fn push_at(&mut self, severity: Severity, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            severity,
            message: message.into(),
            state: ToastState::Entering,
            created: now,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Info, message)
    }

    /// Advance toast states and drop the ones whose exit finished.
    pub fn tick(&mut self, now: Instant) {
        for toast in &mut self.toasts {
            let age = now.saturating_duration_since(toast.created);
            toast.state = if age < ENTER {
                ToastState::Entering
            } else if age < ENTER + LIFETIME {
                ToastState::Visible
            } else {
                ToastState::Leaving
            };
        }
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created) < ENTER + LIFETIME + EXIT);
    }

    /// Manually dismiss a toast.
    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_lifecycle() {
        let mut queue = ToastQueue::new();
        let t0 = Instant::now();

        let id = queue.push_at(Severity::Success, "Opportunity added", t0);

        // Present immediately, still entering
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().unwrap().state, ToastState::Entering);
        assert_eq!(queue.iter().next().unwrap().id, id);

        // Shown shortly after insertion
        queue.tick(t0 + Duration::from_millis(50));
        assert_eq!(queue.iter().next().unwrap().state, ToastState::Visible);

        // Still visible just before the lifetime elapses
        queue.tick(t0 + Duration::from_secs(4));
        assert_eq!(queue.iter().next().unwrap().state, ToastState::Visible);

        // Leaving after the lifetime, removed after the exit transition
        queue.tick(t0 + Duration::from_millis(4100));
        assert_eq!(queue.iter().next().unwrap().state, ToastState::Leaving);
        queue.tick(t0 + Duration::from_secs(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_multiple_toasts_keep_insertion_order() {
        let mut queue = ToastQueue::new();
        let t0 = Instant::now();
        queue.push_at(Severity::Success, "first", t0);
        queue.push_at(Severity::Error, "second", t0 + Duration::from_millis(10));
        queue.push_at(Severity::Info, "third", t0 + Duration::from_millis(20));

        let messages: Vec<&str> = queue.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::new();
        let t0 = Instant::now();
        let id = queue.push_at(Severity::Info, "dismiss me", t0);
        queue.push_at(Severity::Info, "keep me", t0);

        queue.dismiss(id);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().unwrap().message, "keep me");
    }

    #[test]
    fn test_severity_icons() {
        assert_eq!(Severity::Success.icon(), "✅");
        assert_eq!(Severity::Error.icon(), "❌");
        assert_eq!(Severity::Info.icon(), "ℹ️");
    }
}
