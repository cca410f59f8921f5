//! Terminal implementations of the session ports.

use std::sync::Mutex;

use autolot_core::{Navigator, Notification, NotificationLevel, Notifier};
use tracing::{debug, info};

/// Prints notifications to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "•",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{} {}", marker, notification.message);
    }
}

/// Keeps track of the "current page" of a terminal session.
pub struct ConsoleNavigator {
    current: Mutex<String>,
}

impl ConsoleNavigator {
    pub fn new() -> Self {
        Self {
            current: Mutex::new("/".to_string()),
        }
    }

    fn set(&self, path: &str) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = path.to_string();
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn opened_by_another_window(&self) -> bool {
        false
    }

    fn navigate(&self, path: &str) {
        debug!(path = path, "Navigate");
        self.set(path);
    }

    fn reload(&self, path: &str) {
        info!(path = path, "Session reset, returning to start");
        self.set(path);
    }
}
