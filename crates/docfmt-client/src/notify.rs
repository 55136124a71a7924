//! Transient user notifications ("toasts")

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Where flows report progress and outcomes
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Prints notices to stderr and logs them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    pub quiet: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => tracing::info!(%level, "{}", message),
            NoticeLevel::Success => tracing::info!(%level, "{}", message),
            NoticeLevel::Error => tracing::warn!(%level, "{}", message),
        }

        if self.quiet && level == NoticeLevel::Info {
            return;
        }
        let icon = match level {
            NoticeLevel::Info => "i",
            NoticeLevel::Success => "+",
            NoticeLevel::Error => "x",
        };
        eprintln!("[{}] {}", icon, message);
    }
}
