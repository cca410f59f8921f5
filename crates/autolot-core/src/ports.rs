//! Host-side collaborators of the session core.
//!
//! The session manager and API client never talk to a screen directly. They
//! push user-visible notifications through a `Notifier`, move the user
//! around through a `Navigator`, and learn about user activity from a stream
//! of `ActivityEvent`s. Each host (CLI, GUI shell, tests) supplies its own.

use futures::channel::mpsc;
use tracing::{error, info};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier for headless hosts: notifications only go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => error!(text = %notification.message, "Notification"),
            _ => info!(text = %notification.message, "Notification"),
        }
    }
}

pub trait Navigator: Send + Sync {
    /// Path the user is currently on, e.g. `/` or `/dealer`
    fn current_path(&self) -> String;

    /// True when this window was opened by another one (popup launch)
    fn opened_by_another_window(&self) -> bool;

    /// In-app route change
    fn navigate(&self, path: &str);

    /// Full navigation. The host drops its in-memory state and mounts again.
    fn reload(&self, path: &str);
}

/// User activity signals that keep a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    PointerMove,
    KeyPress,
    Click,
    Scroll,
}

impl ActivityEvent {
    pub const ALL: [ActivityEvent; 4] = [
        ActivityEvent::PointerMove,
        ActivityEvent::KeyPress,
        ActivityEvent::Click,
        ActivityEvent::Scroll,
    ];
}

/// Sending half of an activity source.
#[derive(Debug, Clone)]
pub struct ActivitySender {
    tx: mpsc::UnboundedSender<ActivityEvent>,
}

impl ActivitySender {
    /// Report an activity. Silently dropped once the watchdog is gone.
    pub fn record(&self, event: ActivityEvent) {
        let _ = self.tx.unbounded_send(event);
    }
}

pub type ActivityReceiver = mpsc::UnboundedReceiver<ActivityEvent>;

/// Channel connecting a host's input handling to the idle watchdog.
pub fn activity_channel() -> (ActivitySender, ActivityReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (ActivitySender { tx }, rx)
}
