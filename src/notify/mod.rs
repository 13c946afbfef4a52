//! Transient user-facing notifications.
//!
//! Any component publishes through a cloned [`Notifier`]; the single [`Toaster`]
//! mounted at the application root owns queueing, expiry and rendering.

mod toaster;

use derivative::Derivative;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

pub use toaster::{Toast, Toaster};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text: String,
}

#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug, Default)]
pub struct ToastOptions {
    #[derivative(Default(value = "Duration::from_millis(3000)"))]
    pub success_duration: Duration,
    #[derivative(Default(value = "Duration::from_millis(4000)"))]
    pub warning_duration: Duration,
    #[derivative(Default(value = "Duration::from_millis(4000)"))]
    pub error_duration: Duration,
    /// Vertical spacing between stacked toasts.
    #[derivative(Default(value = "8.0"))]
    pub gutter: f32,
}

impl ToastOptions {
    pub fn duration_for(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Success => self.success_duration,
            Severity::Warning => self.warning_duration,
            Severity::Error => self.error_duration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Sender<Notification>,
}

impl Notifier {
    pub fn publish(&self, severity: Severity, text: impl Into<String>) {
        let notification = Notification {
            severity,
            text: text.into(),
        };
        if self.sender.send(notification).is_err() {
            log::debug!("Toaster is gone; notification dropped");
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.publish(Severity::Success, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.publish(Severity::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.publish(Severity::Error, text);
    }
}

pub fn channel(options: ToastOptions) -> (Notifier, Toaster) {
    let (sender, receiver) = mpsc::channel();
    (Notifier { sender }, Toaster::new(receiver, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations_differ_by_severity() {
        let options = ToastOptions::default();
        assert_eq!(options.duration_for(Severity::Success), Duration::from_secs(3));
        assert_eq!(options.duration_for(Severity::Error), Duration::from_secs(4));
        assert_eq!(options.gutter, 8.0);
    }

    #[test]
    fn publishing_after_toaster_drop_is_silent() {
        let (notifier, toaster) = channel(ToastOptions::default());
        drop(toaster);
        notifier.error("nobody listening");
    }
}
