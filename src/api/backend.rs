use std::future::Future;

use super::error::ApiError;
use super::types::{AppConfig, Job, JobQuery, SearchAck, SearchStatus, Stats, StatusUpdate};
use crate::lifecycle::Status;

/// The tracker's REST surface, as the views and the lifecycle engine see it.
///
/// Implemented by [`ApiClient`](super::ApiClient) over HTTP; tests use an
/// in-memory double. Futures are `Send` so the search poller can run on a
/// spawned task.
pub trait Backend {
    /// `GET /api/jobs`
    fn list_jobs(&self, query: &JobQuery) -> impl Future<Output = Result<Vec<Job>, ApiError>> + Send;

    /// `GET /api/jobs/{id}`
    fn get_job(&self, id: i64) -> impl Future<Output = Result<Job, ApiError>> + Send;

    /// `POST /api/jobs/{id}/status`, returning the authoritative record.
    ///
    /// `Ok(None)` means the backend saved the change but the updated record
    /// could not be read back.
    fn set_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<Option<Job>, ApiError>> + Send;

    /// `PATCH /api/jobs/{id}/notes`, returning the authoritative record.
    fn update_notes(&self, id: i64, notes: &str) -> impl Future<Output = Result<Job, ApiError>> + Send;

    /// `GET /api/stats`
    fn stats(&self) -> impl Future<Output = Result<Stats, ApiError>> + Send;

    /// `GET /api/applications[?status=]`
    fn applications(
        &self,
        status: Option<Status>,
    ) -> impl Future<Output = Result<Vec<Job>, ApiError>> + Send;

    /// `GET /api/config`
    fn config(&self) -> impl Future<Output = Result<AppConfig, ApiError>> + Send;

    /// `POST /api/search`
    fn start_search(&self, role: Option<&str>) -> impl Future<Output = Result<SearchAck, ApiError>> + Send;

    /// `GET /api/search/status`
    fn search_status(&self) -> impl Future<Output = Result<SearchStatus, ApiError>> + Send;
}
