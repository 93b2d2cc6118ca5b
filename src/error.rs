use thiserror::Error;

use crate::api::ApiError;
use crate::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    /// Failures reported by the backend or rejected before sending, as
    /// opposed to problems with the local setup.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Lifecycle(_))
    }
}
