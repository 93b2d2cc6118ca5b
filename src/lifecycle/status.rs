use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Application stages, in pipeline order.
///
/// The order only drives default sorting and the dashboard funnel. Any
/// status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Saved,
    Applied,
    FollowedUp,
    Interview,
    Offer,
    Rejected,
    Declined,
    Withdrawn,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::Saved,
        Status::Applied,
        Status::FollowedUp,
        Status::Interview,
        Status::Offer,
        Status::Rejected,
        Status::Declined,
        Status::Withdrawn,
    ];

    /// Wire key used by the backend.
    pub fn key(self) -> &'static str {
        match self {
            Status::Saved => "saved",
            Status::Applied => "applied",
            Status::FollowedUp => "followed_up",
            Status::Interview => "interview",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Declined => "declined",
            Status::Withdrawn => "withdrawn",
        }
    }

    /// Human label shown by every view.
    pub fn label(self) -> &'static str {
        match self {
            Status::Saved => "Saved",
            Status::Applied => "Applied",
            Status::FollowedUp => "Followed Up",
            Status::Interview => "Interview",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Declined => "Declined",
            Status::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// A status as received from the backend.
///
/// The backend is free to send strings outside the closed set; those are
/// kept verbatim and rendered as themselves instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusValue {
    Known(Status),
    Other(String),
}

impl StatusValue {
    pub fn known(&self) -> Option<Status> {
        match self {
            StatusValue::Known(status) => Some(*status),
            StatusValue::Other(_) => None,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StatusValue::Known(status) => status.key(),
            StatusValue::Other(raw) => raw,
        }
    }

    /// Label for display; unrecognized values fall back to the raw string.
    pub fn label(&self) -> &str {
        match self {
            StatusValue::Known(status) => status.label(),
            StatusValue::Other(raw) => raw,
        }
    }

    pub fn is(&self, status: Status) -> bool {
        self.known() == Some(status)
    }
}

impl From<Status> for StatusValue {
    fn from(status: Status) -> Self {
        StatusValue::Known(status)
    }
}

impl From<String> for StatusValue {
    fn from(raw: String) -> Self {
        match raw.parse::<Status>() {
            Ok(status) => StatusValue::Known(status),
            Err(_) => StatusValue::Other(raw),
        }
    }
}

impl From<StatusValue> for String {
    fn from(value: StatusValue) -> Self {
        match value {
            StatusValue::Known(status) => status.key().to_string(),
            StatusValue::Other(raw) => raw,
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One entry of the shared key/label lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub key: &'static str,
    pub label: &'static str,
}

/// The closed status set in pipeline order, with fixed labels.
pub fn list_statuses() -> Vec<StatusInfo> {
    Status::ALL
        .into_iter()
        .map(|status| StatusInfo {
            key: status.key(),
            label: status.label(),
        })
        .collect()
}
