use std::time::{Duration, Instant};

use model_api::{Notice, NoticeLevel};

/// The maximum amount of lines kept in the event log.
pub const MAX_LOGS: usize = 200;

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// A single log entry shown in the event panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
}

/// A transient message shown in the status line.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: NoticeLevel,
    pub message: String,
    pub shown_at: Instant,
}

/// User facing notifications: the event log plus the current toast.
#[derive(Debug, Default)]
pub struct Notices {
    logs: Vec<LogLine>,
    toast: Option<Toast>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs an informational message without a toast.
    pub fn log(&mut self, message: impl Into<String>) {
        self.push_log("INFO", message.into());
    }

    /// Shows an informational toast and logs it.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        });
    }

    /// Shows an error toast and logs it.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }

    pub fn push(&mut self, notice: Notice) {
        let level = match notice.level {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Error => "ERROR",
        };
        self.push_log(level, notice.message.clone());

        self.toast = Some(Toast {
            level: notice.level,
            message: notice.message,
            shown_at: Instant::now(),
        });
    }

    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Drops the toast once it outlived [`TOAST_TTL`].
    ///
    /// Should be called once per frame tick.
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= TOAST_TTL);

        if expired {
            self.toast = None;
        }
    }

    fn push_log(&mut self, level: &'static str, message: String) {
        self.logs.push(LogLine { level, message });
        if self.logs.len() > MAX_LOGS {
            let drain = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..drain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_are_trimmed_to_the_newest() {
        let mut notices = Notices::new();
        for i in 0..MAX_LOGS + 10 {
            notices.log(format!("line {i}"));
        }

        assert_eq!(notices.logs().len(), MAX_LOGS);
        assert_eq!(notices.logs()[0].message, "line 10");
        assert!(notices.toast().is_none());
    }

    #[test]
    fn toasts_expire() {
        let mut notices = Notices::new();
        notices.error("request failed");

        let shown_at = notices.toast().unwrap().shown_at;
        notices.tick(shown_at + Duration::from_secs(1));
        assert!(notices.toast().is_some());

        notices.tick(shown_at + TOAST_TTL);
        assert!(notices.toast().is_none());
        assert_eq!(notices.logs()[0].level, "ERROR");
    }
}
