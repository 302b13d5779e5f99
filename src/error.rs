//! Process-level errors and exit codes.

use std::process::ExitCode;

use thiserror::Error;

use crate::alerting::NotifyError;
use crate::config::loader::ConfigError;
use crate::lifecycle::StartupError;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("failed to build notifier: {0}")]
    Notifier(#[from] NotifyError),

    #[error("monitor task failed: {0}")]
    Runtime(String),
}

impl WatcherError {
    /// Numeric process status: 2 for configuration, 3 for a log file that
    /// never appeared, 1 for anything else.
    pub fn status(&self) -> u8 {
        match self {
            WatcherError::Config(_) => 2,
            WatcherError::Startup(_) => 3,
            WatcherError::Notifier(_) | WatcherError::Runtime(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}
