//! In-memory [`Backend`] double with call recording and failure injection.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::backend::Backend;
use super::error::ApiError;
use super::types::{AppConfig, Job, JobQuery, SearchAck, SearchStatus, Stats, StatusUpdate};
use crate::lifecycle::{Status, StatusValue};

pub const STAMP: &str = "2026-03-01T10:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListJobs,
    GetJob,
    SetStatus,
    UpdateNotes,
    Stats,
    Applications,
    Config,
    StartSearch,
    SearchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListJobs,
    GetJob(i64),
    SetStatus { id: i64, status: Status, notes: String },
    UpdateNotes { id: i64, notes: String },
    Stats,
    Applications(Option<Status>),
    Config,
    StartSearch(Option<String>),
    SearchStatus,
}

#[derive(Default)]
struct State {
    jobs: BTreeMap<i64, Job>,
    calls: Vec<Call>,
    failures: HashMap<Endpoint, (u16, String)>,
    search: VecDeque<SearchStatus>,
    last_search: SearchStatus,
    status_without_job: bool,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

pub fn job(id: i64, status: Option<Status>) -> Job {
    Job {
        id,
        title: format!("Designer {id}"),
        company: format!("Company {id}"),
        location: Some("Remote".into()),
        url: None,
        source: Some("Remotive".into()),
        score: Some(10 * id),
        date_posted: None,
        salary: None,
        salary_min: None,
        salary_max: None,
        employment_type: None,
        is_remote: true,
        experience_level: None,
        apply_deadline: None,
        description: None,
        status: status.map(StatusValue::from),
        notes: None,
        applied_at: None,
        followed_up: None,
        interview_at: None,
        updated_at: None,
    }
}

impl MockBackend {
    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            for job in jobs {
                state.jobs.insert(job.id, job);
            }
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Make every call to `endpoint` fail with `status` and `body`.
    pub fn fail(&self, endpoint: Endpoint, status: u16, body: &str) {
        self.lock()
            .failures
            .insert(endpoint, (status, body.to_string()));
    }

    pub fn heal(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Change a record behind the client's back, as another writer would.
    pub fn touch(&self, id: i64, status: Option<Status>) {
        if let Some(job) = self.lock().jobs.get_mut(&id) {
            job.status = status.map(StatusValue::from);
        }
    }

    pub fn stored(&self, id: i64) -> Option<Job> {
        self.lock().jobs.get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Save status changes but answer as if the record could not be read back.
    pub fn lose_status_replies(&self) {
        self.lock().status_without_job = true;
    }

    /// Queue search status replies; the last one repeats once the queue drains.
    pub fn script_search(&self, replies: impl IntoIterator<Item = SearchStatus>) {
        self.lock().search.extend(replies);
    }

    fn record(&self, call: Call, endpoint: Endpoint) -> Result<MutexGuard<'_, State>, ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some((status, message)) = state.failures.get(&endpoint) {
            return Err(ApiError::Status {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(state)
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not Found".into(),
    }
}

impl Backend for MockBackend {
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, ApiError> {
        let state = self.record(Call::ListJobs, Endpoint::ListJobs)?;
        Ok(state
            .jobs
            .values()
            .filter(|job| query.status.is_none_or(|s| job.effective_status().is(s)))
            .filter(|job| query.min_score.is_none_or(|min| job.score() >= min))
            .filter(|job| !query.is_remote || job.is_remote)
            .filter(|job| {
                query.q.as_deref().is_none_or(|q| {
                    let q = q.to_lowercase();
                    job.title.to_lowercase().contains(&q) || job.company.to_lowercase().contains(&q)
                })
            })
            .cloned()
            .collect())
    }

    async fn get_job(&self, id: i64) -> Result<Job, ApiError> {
        let state = self.record(Call::GetJob(id), Endpoint::GetJob)?;
        state.jobs.get(&id).cloned().ok_or_else(not_found)
    }

    async fn set_status(&self, id: i64, update: &StatusUpdate) -> Result<Option<Job>, ApiError> {
        let mut state = self.record(
            Call::SetStatus {
                id,
                status: update.status,
                notes: update.notes.clone(),
            },
            Endpoint::SetStatus,
        )?;
        let job = state.jobs.get_mut(&id).ok_or_else(not_found)?;
        job.status = Some(update.status.into());
        if !update.notes.is_empty() {
            job.notes = Some(update.notes.clone());
        }
        match update.status {
            Status::Applied => job.applied_at = Some(STAMP.into()),
            Status::FollowedUp => job.followed_up = Some(STAMP.into()),
            Status::Interview => job.interview_at = Some(STAMP.into()),
            _ => {}
        }
        job.updated_at = Some(STAMP.into());
        let job = job.clone();
        Ok(Some(job).filter(|_| !state.status_without_job))
    }

    async fn update_notes(&self, id: i64, notes: &str) -> Result<Job, ApiError> {
        let mut state = self.record(
            Call::UpdateNotes {
                id,
                notes: notes.to_string(),
            },
            Endpoint::UpdateNotes,
        )?;
        let job = state.jobs.get_mut(&id).ok_or_else(not_found)?;
        job.notes = Some(notes.to_string());
        if job.status.is_none() {
            job.status = Some(Status::Saved.into());
        }
        Ok(job.clone())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        let state = self.record(Call::Stats, Endpoint::Stats)?;
        let mut stats = Stats {
            total_jobs_found: state.jobs.len() as u64,
            ..Default::default()
        };
        for status in state.jobs.values().filter_map(|j| j.status.as_ref()) {
            *stats.by_status.entry(status.key().to_string()).or_default() += 1;
        }
        Ok(stats)
    }

    async fn applications(&self, status: Option<Status>) -> Result<Vec<Job>, ApiError> {
        let state = self.record(Call::Applications(status), Endpoint::Applications)?;
        Ok(state
            .jobs
            .values()
            .filter(|job| match (&job.status, status) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(value), Some(wanted)) => value.is(wanted),
            })
            .cloned()
            .collect())
    }

    async fn config(&self) -> Result<AppConfig, ApiError> {
        let state = self.record(Call::Config, Endpoint::Config)?;
        let mut sources: Vec<String> = state.jobs.values().filter_map(|j| j.source.clone()).collect();
        sources.sort();
        sources.dedup();
        Ok(AppConfig {
            sources,
            target_roles: vec!["Product Designer".into()],
            statuses: Status::ALL.iter().map(|s| s.key().to_string()).collect(),
        })
    }

    async fn start_search(&self, role: Option<&str>) -> Result<SearchAck, ApiError> {
        self.record(Call::StartSearch(role.map(str::to_string)), Endpoint::StartSearch)?;
        Ok(SearchAck {
            ok: true,
            message: Some("Search started".into()),
        })
    }

    async fn search_status(&self) -> Result<SearchStatus, ApiError> {
        let mut state = self.record(Call::SearchStatus, Endpoint::SearchStatus)?;
        if let Some(next) = state.search.pop_front() {
            state.last_search = next;
        }
        Ok(state.last_search.clone())
    }
}
