mod actions;
mod engine;
mod error;
mod status;

pub use actions::{Intent, SuggestedAction, find_action, manual_targets, suggested_next_actions};
pub use engine::{Lifecycle, TransitionOutcome};
pub use error::{LifecycleError, ValidationError};
pub use status::{Status, StatusInfo, StatusValue, list_statuses};
