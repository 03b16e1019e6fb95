use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::info;

use crate::dom::Dom;

pub const TOAST_DURATION: Duration = Duration::from_millis(4000);

pub const STATUS_CONTAINER_ID: &str = "div-message";
pub const STATUS_TEXT_ID: &str = "password-message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Rounded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub duration: Duration,
    pub style: ToastStyle,
    pub shown_at: Instant,
}

impl Toast {
    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.duration
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}

/// Transient, non-blocking user notifications.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Toasts in the order they were raised. Identical messages are kept as
/// separate entries.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_at(&mut self, message: &str, now: Instant) {
        self.toasts.push_back(Toast {
            message: message.to_string(),
            duration: TOAST_DURATION,
            style: ToastStyle::Rounded,
            shown_at: now,
        });
    }

    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |toast| toast.is_visible(now))
    }

    /// Drops every toast whose display time has elapsed.
    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.is_visible(now));
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.toasts.iter().map(|t| t.message.as_str()).collect()
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    /// Raises a toast at `now`, dropping the ones that already expired.
    pub fn notify_at(&mut self, message: &str, now: Instant) {
        info!(toast = message, "notification raised");
        self.prune(now);
        self.push_at(message, now);
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, message: &str) {
        self.notify_at(message, Instant::now());
    }
}

/// The persistent status element used by full-page forms.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    pub container_id: String,
    pub text_id: String,
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self {
            container_id: STATUS_CONTAINER_ID.to_string(),
            text_id: STATUS_TEXT_ID.to_string(),
        }
    }
}

impl StatusBanner {
    pub fn show<D: Dom + ?Sized>(&self, dom: &mut D, style_class: &str, message: &str) {
        dom.set_class(&self.container_id, style_class);
        dom.set_text(&self.text_id, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};

    #[test]
    fn toasts_queue_without_dedup() {
        let mut queue = ToastQueue::new();
        queue.notify("same");
        queue.notify("same");
        assert_eq!(queue.messages(), vec!["same", "same"]);
        assert!(queue
            .drain()
            .iter()
            .all(|t| t.duration == TOAST_DURATION && t.style == ToastStyle::Rounded));
        assert!(queue.is_empty());
    }

    #[test]
    fn toasts_expire_after_four_seconds() {
        let start = Instant::now();
        let mut queue = ToastQueue::new();
        queue.push_at("a", start);
        queue.push_at("b", start + Duration::from_millis(1000));

        let later = start + Duration::from_millis(4500);
        let visible: Vec<_> = queue.visible(later).map(|t| t.message.clone()).collect();
        assert_eq!(visible, vec!["b".to_string()]);

        queue.prune(later);
        assert_eq!(queue.len(), 1);
        queue.prune(start + Duration::from_millis(5000));
        assert!(queue.is_empty());
    }

    #[test]
    fn raising_a_toast_drops_expired_ones() {
        let start = Instant::now();
        let mut queue = ToastQueue::new();
        queue.notify_at("old", start);
        queue.notify_at("recent", start + Duration::from_millis(3000));
        queue.notify_at("new", start + Duration::from_millis(5000));
        assert_eq!(queue.messages(), vec!["recent", "new"]);
    }

    #[test]
    fn status_replaces_class_and_text() {
        let mut doc = Document::new();
        doc.insert(STATUS_CONTAINER_ID, Element::new("hide old", ""));
        doc.insert(STATUS_TEXT_ID, Element::new("", "previous"));
        StatusBanner::default().show(&mut doc, "red accent-4", "nope");
        assert_eq!(doc.class(STATUS_CONTAINER_ID), Some("red accent-4"));
        assert_eq!(doc.text(STATUS_TEXT_ID).as_deref(), Some("nope"));
    }
}
