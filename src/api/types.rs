//! Request and response types for the tracker REST backend.
//!
//! The backend is loose about shapes: `/api/jobs` names the application
//! columns `app_status`/`app_notes` while `/api/applications` uses
//! `status`/`notes`, booleans arrive as `0`/`1`, and most descriptive fields
//! may be null. The types here accept all of that.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::lifecycle::{Status, StatusValue};

/// A job listing plus its optional application-tracking fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub salary_min: Option<String>,
    #[serde(default)]
    pub salary_max: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_remote: bool,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub apply_deadline: Option<String>,
    /// Only present on `GET /api/jobs/{id}`.
    #[serde(default)]
    pub description: Option<String>,

    /// Absent when the job was discovered but never tracked.
    #[serde(default, alias = "app_status", deserialize_with = "status_or_none")]
    pub status: Option<StatusValue>,
    #[serde(default, alias = "app_notes")]
    pub notes: Option<String>,
    #[serde(default)]
    pub applied_at: Option<String>,
    #[serde(default)]
    pub followed_up: Option<String>,
    #[serde(default)]
    pub interview_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Job {
    /// Status used for comparisons and suggestions; untracked jobs count as saved.
    pub fn effective_status(&self) -> StatusValue {
        self.status
            .clone()
            .unwrap_or(StatusValue::Known(Status::Saved))
    }

    /// Whether the job has any application record at all.
    pub fn is_tracked(&self) -> bool {
        self.status.is_some()
    }

    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }

    pub fn score(&self) -> i64 {
        self.score.unwrap_or_default()
    }
}

// Null and empty strings both mean "no status".
fn status_or_none<'de, D>(deserializer: D) -> Result<Option<StatusValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(StatusValue::from))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// SQLite hands booleans over as integers.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

/// Sort orders understood by `GET /api/jobs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Score,
    Date,
    Company,
}

/// Query string for `GET /api/jobs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<i64>,
    #[serde(skip_serializing_if = "is_false", serialize_with = "one_if_set")]
    pub is_remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn one_if_set<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Body of `POST /api/jobs/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
    /// Empty means "keep the notes already stored".
    pub notes: String,
}

/// Reply of `POST /api/jobs/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdated {
    #[serde(default)]
    pub job: Option<Job>,
}

/// Body of `PATCH /api/jobs/{id}/notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesUpdate {
    pub notes: String,
}

/// Aggregate counts from `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_jobs_found: u64,
    /// Application counts keyed by raw status string.
    #[serde(flatten)]
    pub by_status: BTreeMap<String, u64>,
}

impl Stats {
    pub fn count(&self, status: Status) -> u64 {
        self.by_status.get(status.key()).copied().unwrap_or_default()
    }

    pub fn tracked(&self) -> u64 {
        self.by_status.values().sum()
    }

    /// Counts in pipeline order, followed by any statuses outside the closed set.
    pub fn funnel(&self) -> Vec<(StatusValue, u64)> {
        let mut rows: Vec<_> = Status::ALL
            .into_iter()
            .map(|status| (StatusValue::Known(status), self.count(status)))
            .collect();
        rows.extend(
            self.by_status
                .iter()
                .filter(|(key, _)| key.parse::<Status>().is_err())
                .map(|(key, n)| (StatusValue::Other(key.clone()), *n)),
        );
        rows
    }
}

/// Reply of `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Acknowledgement of `POST /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply of `GET /api/search/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub found: u64,
}
