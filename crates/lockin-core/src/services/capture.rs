//! Screenshot capture via a configured shell command.

use std::path::PathBuf;

use chrono::Local;

use super::{shell, ScreenCapturer};
use crate::error::ServiceError;

/// Runs a configured screenshot command, substituting `{output}` with
/// the target path. Screenshots land in `screenshots_dir` with a
/// timestamped name.
#[derive(Debug, Clone)]
pub struct CommandCapturer {
    command: String,
    screenshots_dir: PathBuf,
}

impl CommandCapturer {
    pub fn new(command: impl Into<String>, screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            screenshots_dir: screenshots_dir.into(),
        }
    }

    fn output_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.screenshots_dir.join(format!("screenshot_{stamp}.png"))
    }
}

impl ScreenCapturer for CommandCapturer {
    async fn capture(&self) -> Result<PathBuf, ServiceError> {
        std::fs::create_dir_all(&self.screenshots_dir).map_err(|e| {
            ServiceError::Unavailable(format!(
                "cannot create screenshots dir {}: {e}",
                self.screenshots_dir.display()
            ))
        })?;

        let path = self.output_path();
        let command = self
            .command
            .replace("{output}", &path.display().to_string());

        let status = shell(&command)
            .status()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("screenshot command failed: {e}")))?;

        if !status.success() {
            return Err(ServiceError::Unavailable(format!(
                "screenshot command exited with {status}"
            )));
        }
        if !path.exists() {
            return Err(ServiceError::Unavailable(format!(
                "screenshot command produced no file at {}",
                path.display()
            )));
        }
        Ok(path)
    }
}
