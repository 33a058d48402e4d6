//! User-facing notifications.
//!
//! The crate only produces message text and a kind; displaying it is up to
//! whichever [`Notifier`] is plugged in. [`ToastQueue`] keeps the set of
//! currently visible toasts for a front end to render.

use crate::calculator::EvaluationResult;
use crate::format::format_number;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// How long a toast stays up unless configured otherwise.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Maximum toasts shown at once; older ones are dropped first.
const MAX_VISIBLE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub duration: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Message for an evaluated expression: `= 7` or the error text.
    pub fn from_result(result: &EvaluationResult, precision: usize) -> Self {
        match result {
            EvaluationResult::Number(value) => {
                Self::success(format!("= {}", format_number(*value, precision)))
            }
            EvaluationResult::Failure(err) => Self::error(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Something that can show a notification to the user.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Writes notifications to the log instead of a screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notification: Notification) {
        let duration_ms = notification.duration.as_millis() as u64;
        match notification.kind {
            NotificationKind::Success => {
                info!(text = %notification.message, duration_ms, "Notification")
            }
            NotificationKind::Error => {
                error!(text = %notification.message, duration_ms, "Notification")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Clone, Debug)]
pub struct Toast {
    pub id: ToastId,
    pub notification: Notification,
    pub expires_at: Instant,
}

/// Currently visible toasts, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast as of `now`, evicting the oldest if the queue is full.
    pub fn push_at(&mut self, notification: Notification, now: Instant) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;

        let expires_at = now + notification.duration;
        self.toasts.push_back(Toast {
            id,
            notification,
            expires_at,
        });
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
        id
    }

    /// Close a toast before it expires.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drop toasts that have expired by `now`. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        before - self.toasts.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, notification: Notification) {
        let now = Instant::now();
        self.prune(now);
        self.push_at(notification, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::evaluate;

    #[test]
    fn test_from_result() {
        let ok = Notification::from_result(&evaluate("1+2*3"), 6);
        assert_eq!(ok.message, "= 7");
        assert_eq!(ok.kind, NotificationKind::Success);

        let err = Notification::from_result(&evaluate("1/0"), 6);
        assert!(err.is_error());
        assert!(err.message.starts_with("Calculation error"));
    }

    #[test]
    fn test_toasts_expire() {
        let mut queue = ToastQueue::new();
        let now = Instant::now();
        queue.push_at(Notification::success("short").with_duration(Duration::from_millis(100)), now);
        queue.push_at(Notification::error("long"), now);

        assert_eq!(queue.prune(now + Duration::from_millis(50)), 0);
        assert_eq!(queue.prune(now + Duration::from_millis(100)), 1);
        let remaining: Vec<_> = queue.visible().map(|t| t.notification.message.as_str()).collect();
        assert_eq!(remaining, vec!["long"]);
        assert_eq!(queue.prune(now + DEFAULT_TOAST_DURATION), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::new();
        let id = queue.push_at(Notification::success("hi"), Instant::now());
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
    }

    #[test]
    fn test_queue_is_capped() {
        let mut queue = ToastQueue::new();
        let now = Instant::now();
        for i in 0..5 {
            queue.push_at(Notification::success(format!("toast {i}")), now);
        }
        assert_eq!(queue.len(), MAX_VISIBLE);
        assert_eq!(
            queue.visible().next().map(|t| t.notification.message.clone()),
            Some("toast 2".to_string())
        );
    }

    #[test]
    fn test_notifier_trait() {
        let mut queue = ToastQueue::new();
        queue.notify(Notification::error("boom"));
        assert_eq!(queue.len(), 1);
        TracingNotifier.notify(Notification::success("logged"));
    }
}
