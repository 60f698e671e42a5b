//! Interfaces to the host environment.
//!
//! The engine never touches the file system or the user interface directly;
//! the host hands it implementations of these traits and forwards its events.

use log::{error, info, warn};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File access used to (re)load the configuration.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileEventKind {
    Created,
    Changed,
    Deleted,
}

/// A file watcher notification, as delivered by the host.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(kind: FileEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message raised at a configuration load or delete boundary.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
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

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to the `log` facade. Used when the host has no
/// message channel of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!("{}", notification.message),
            NotificationLevel::Warning => warn!("{}", notification.message),
            NotificationLevel::Error => error!("{}", notification.message),
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the notifications received so far.
    pub fn take(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(mut received) => std::mem::take(&mut *received),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        match self.received.lock() {
            Ok(mut received) => received.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
