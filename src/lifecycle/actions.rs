//! Suggested next steps for a job, derived from its current status only.
//!
//! Suggestions are what the table shows as one-click buttons. They never
//! restrict the manual selector: [`manual_targets`] always offers every
//! other status.

use serde::Serialize;

use super::error::ValidationError;
use super::status::{Status, StatusValue};

/// Visual hint for how an action button should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    /// Moves the application forward.
    Primary,
    /// Ends or abandons the application.
    Danger,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedAction {
    pub label: &'static str,
    pub target: Status,
    pub intent: Intent,
}

const fn action(label: &'static str, target: Status, intent: Intent) -> SuggestedAction {
    SuggestedAction {
        label,
        target,
        intent,
    }
}

const FROM_SAVED: &[SuggestedAction] = &[
    action("Apply", Status::Applied, Intent::Primary),
    action("Skip", Status::Declined, Intent::Danger),
];

const FROM_APPLIED: &[SuggestedAction] = &[
    action("Follow Up", Status::FollowedUp, Intent::Primary),
    action("Interview", Status::Interview, Intent::Primary),
    action("Reject", Status::Rejected, Intent::Danger),
];

const FROM_FOLLOWED_UP: &[SuggestedAction] = &[
    action("Interview", Status::Interview, Intent::Primary),
    action("Reject", Status::Rejected, Intent::Danger),
];

const FROM_INTERVIEW: &[SuggestedAction] = &[
    action("Offer!", Status::Offer, Intent::Primary),
    action("Reject", Status::Rejected, Intent::Danger),
];

const FROM_OFFER: &[SuggestedAction] = &[action("Declined", Status::Declined, Intent::Danger)];

const REOPEN: &[SuggestedAction] = &[action("Reopen", Status::Saved, Intent::Neutral)];

/// Ordered quick actions for a job currently in `current`.
pub fn suggested_next_actions(current: &StatusValue) -> &'static [SuggestedAction] {
    match current.known() {
        Some(status) => actions_for(status),
        None => REOPEN,
    }
}

fn actions_for(status: Status) -> &'static [SuggestedAction] {
    match status {
        Status::Saved => FROM_SAVED,
        Status::Applied => FROM_APPLIED,
        Status::FollowedUp => FROM_FOLLOWED_UP,
        Status::Interview => FROM_INTERVIEW,
        Status::Offer => FROM_OFFER,
        Status::Rejected | Status::Declined | Status::Withdrawn => REOPEN,
    }
}

/// Look up a suggested action by its label (case-insensitive).
pub fn find_action(current: &StatusValue, label: &str) -> Result<SuggestedAction, ValidationError> {
    let wanted = label.trim();
    suggested_next_actions(current)
        .iter()
        .find(|a| a.label.eq_ignore_ascii_case(wanted))
        .copied()
        .ok_or_else(|| ValidationError::UnknownAction {
            action: label.to_string(),
            status: current.key().to_string(),
        })
}

/// Every status the manual selector offers: all of them except `current`.
pub fn manual_targets(current: &StatusValue) -> Vec<Status> {
    Status::ALL
        .into_iter()
        .filter(|status| !current.is(*status))
        .collect()
}
