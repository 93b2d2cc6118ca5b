use thiserror::Error;

use crate::api::ApiError;

/// Rejections raised locally, before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("no '{action}' action for a job in status '{status}'")]
    UnknownAction { action: String, status: String },
}

/// Failure of a lifecycle mutation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The request failed or the backend answered non-2xx.
    #[error(transparent)]
    Network(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LifecycleError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LifecycleError::Validation(_))
    }
}
