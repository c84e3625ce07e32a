//! Notification sinks.
//!
//! [`SpeechNotifier`] speaks the alert through a text-to-speech command
//! (`say` on macOS, `espeak` elsewhere). [`LogNotifier`] only logs,
//! for headless setups and tests. Both are fire-and-forget from the
//! pipeline's point of view; callers log failures and move on.

use log::info;

use super::{shell, NotificationSink};
use crate::error::ServiceError;

/// Speaks notifications through a text-to-speech command.
///
/// The command runs through the platform shell, so flags are allowed
/// (e.g. `say -v Alex`). `{message}` is replaced with the alert text
/// when present; otherwise the text is appended quoted.
#[derive(Debug, Clone)]
pub struct SpeechNotifier {
    command: String,
}

impl SpeechNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl NotificationSink for SpeechNotifier {
    async fn notify(&self, message: &str) -> Result<(), ServiceError> {
        let command = if self.command.contains("{message}") {
            self.command.replace("{message}", message)
        } else {
            format!("{} \"{message}\"", self.command)
        };

        let status = shell(&command).status().await.map_err(|e| {
            ServiceError::Unavailable(format!("speech command '{}' failed: {e}", self.command))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ServiceError::Unavailable(format!(
                "speech command '{}' exited with {status}",
                self.command
            )))
        }
    }
}

/// Logs notifications instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), ServiceError> {
        info!("notification: {message}");
        Ok(())
    }
}
