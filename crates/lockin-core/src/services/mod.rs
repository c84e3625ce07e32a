//! External service contracts.
//!
//! The pipeline treats screen capture, vision description, text
//! generation, and notification as black-box collaborators behind these
//! traits. Handles are injected explicitly into the components that
//! need them, so tests substitute stubs and nothing holds hidden
//! process-wide service state.

pub mod capture;
pub mod notify;
pub mod ollama;

pub use capture::CommandCapturer;
pub use notify::{LogNotifier, SpeechNotifier};
pub use ollama::{OllamaGenerator, OllamaVision};

use std::path::{Path, PathBuf};

use crate::error::ServiceError;

/// Run a configured command line through the platform shell.
#[cfg(unix)]
pub(crate) fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
pub(crate) fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Captures one screenshot and returns the image path.
pub trait ScreenCapturer {
    fn capture(&self) -> impl std::future::Future<Output = Result<PathBuf, ServiceError>> + Send;
}

/// Describes on-screen content of an image in natural language.
///
/// Failure is any non-text or empty response.
pub trait DescriptionService {
    fn describe(
        &self,
        image: &Path,
    ) -> impl std::future::Future<Output = Result<String, ServiceError>> + Send;
}

/// Produces free-form text for a prompt.
///
/// The raw response carries no schema guarantees; callers extract and
/// validate whatever structure they expect.
pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, ServiceError>> + Send;
}

/// Fire-and-forget alert channel.
///
/// Failures are logged by callers, never propagated into the pipeline.
pub trait NotificationSink {
    fn notify(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;
}
