use std::ops::Range;

use tracing::warn;

use super::Notice;
use crate::api::{ApiError, Backend, Job, JobQuery};
use crate::lifecycle::{Lifecycle, suggested_next_actions};
use crate::ui;

/// Filters, sort and paging of one table instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub query: JobQuery,
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
}

impl TableState {
    pub fn new(query: JobQuery, page_size: usize) -> Self {
        Self {
            query,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    fn page_range(&self, total: usize) -> Range<usize> {
        let page = self.page.min(self.page_count(total) - 1);
        let start = page * self.page_size;
        start..(start + self.page_size).min(total)
    }
}

/// Jobs currently shown by a [`TableView`].
///
/// Only the owning table writes to it: on its own quick actions and through
/// [`TableView::refresh_row_by_id`].
#[derive(Debug, Default)]
pub struct JobCache {
    jobs: Vec<Job>,
}

impl JobCache {
    pub fn get(&self, id: i64) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn replace(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    /// Replace the cached copy of `job` in place. Returns false if it isn't cached.
    fn patch(&mut self, job: Job) -> bool {
        match self.jobs.iter_mut().find(|cached| cached.id == job.id) {
            Some(slot) => {
                *slot = job;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Loading,
    Ready,
    Failed(String),
}

/// Paged table of jobs with one-click suggested actions per row.
#[derive(Debug)]
pub struct TableView {
    state: TableState,
    cache: JobCache,
    content: Content,
}

impl TableView {
    pub fn new(state: TableState) -> Self {
        Self {
            state,
            cache: JobCache::default(),
            content: Content::Loading,
        }
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn cache(&self) -> &JobCache {
        &self.cache
    }

    /// Fetch the jobs matching the current filters and replace the cache.
    ///
    /// On failure the previous rows are dropped and the table renders the
    /// error in place of its rows.
    pub async fn load<B: Backend>(&mut self, backend: &B) -> Result<usize, ApiError> {
        match backend.list_jobs(&self.state.query).await {
            Ok(jobs) => {
                self.cache.replace(jobs);
                self.content = Content::Ready;
                self.state.page = self.state.page.min(self.page_count() - 1);
                Ok(self.cache.len())
            }
            Err(err) => {
                self.cache.replace(Vec::new());
                self.content = Content::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.state.page_count(self.cache.len())
    }

    pub fn next_page(&mut self) -> bool {
        if self.state.page + 1 < self.page_count() {
            self.state.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.state.page > 0 {
            self.state.page -= 1;
            true
        } else {
            false
        }
    }

    /// Run a row's suggested action and patch that row from the reply.
    pub async fn quick_action<B: Backend>(
        &mut self,
        engine: &Lifecycle<B>,
        id: i64,
        label: &str,
    ) -> Notice {
        let Some(job) = self.cache.get(id) else {
            return Notice::error(format!("Job #{id} is not in this table"));
        };

        let result = engine.quick_action(job, label).await;
        match result {
            Ok(outcome) => {
                let message = outcome.describe(id);
                if let Some(updated) = outcome.into_job() {
                    self.cache.patch(updated);
                }
                Notice::info(message)
            }
            Err(err) => Notice::from(&err),
        }
    }

    /// Re-fetch a single row after another view changed it.
    ///
    /// Returns whether the row was updated. A failed fetch keeps the
    /// last-known row.
    pub async fn refresh_row_by_id<B: Backend>(&mut self, backend: &B, id: i64) -> bool {
        if self.cache.get(id).is_none() {
            return false;
        }
        match backend.get_job(id).await {
            Ok(job) => self.cache.patch(job),
            Err(err) => {
                warn!(job_id = id, error = %err, "row refresh failed, keeping last known data");
                false
            }
        }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![ui::heading("Jobs")];
        match &self.content {
            Content::Loading => lines.push(ui::muted("Loading jobs...")),
            Content::Failed(message) => lines.push(ui::notice_line(&Notice::error(format!(
                "Could not load jobs: {message}"
            )))),
            Content::Ready if self.cache.is_empty() => {
                lines.push("No jobs match these filters.".to_string());
                lines.push(ui::muted("Run `search` to look for new listings."));
            }
            Content::Ready => {
                lines.push(format!(
                    "{:>5}  {:>5}  {}  {}  {}  ACTIONS",
                    "ID",
                    "SCORE",
                    ui::fit("TITLE", 32),
                    ui::fit("COMPANY", 20),
                    ui::fit("STATUS", 11),
                ));
                let range = self.state.page_range(self.cache.len());
                lines.extend(self.cache.jobs()[range].iter().map(render_row));
                lines.push(ui::muted(&format!(
                    "Page {}/{} · {} jobs",
                    self.state.page + 1,
                    self.page_count(),
                    self.cache.len()
                )));
            }
        }
        lines
    }
}

fn render_row(job: &Job) -> String {
    let status = job.effective_status();
    let padding = 11usize.saturating_sub(status.label().chars().count());
    let actions: Vec<String> = suggested_next_actions(&status)
        .iter()
        .map(ui::action_button)
        .collect();
    format!(
        "{:>5}  {:>5}  {}  {}  {}{}  {}",
        job.id,
        job.score(),
        ui::fit(&job.title, 32),
        ui::fit(&job.company, 20),
        ui::status_badge(&status),
        " ".repeat(padding),
        actions.join(" ")
    )
}
