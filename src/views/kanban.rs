use tracing::warn;

use super::Notice;
use crate::api::{ApiError, Backend, Job};
use crate::lifecycle::{Lifecycle, Status, manual_targets};
use crate::ui;

/// One pipeline column of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: Status,
    pub cards: Vec<Job>,
}

/// Board grouping tracked applications by status.
///
/// Jobs with no application record are never shown. Jobs whose status is
/// outside the closed set go to a trailing "Other" lane instead of a column.
#[derive(Debug)]
pub struct KanbanView {
    columns: Vec<Column>,
    other: Vec<Job>,
    failed: Option<String>,
    filter: Option<Status>,
}

impl Default for KanbanView {
    fn default() -> Self {
        Self {
            columns: Status::ALL
                .into_iter()
                .map(|status| Column {
                    status,
                    cards: Vec::new(),
                })
                .collect(),
            other: Vec::new(),
            failed: None,
            filter: None,
        }
    }
}

impl KanbanView {
    pub fn from_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        let mut board = Self::default();
        for job in jobs {
            board.place(job);
        }
        board
    }

    /// Board that only shows the column for `status`.
    pub fn filtered(status: Option<Status>) -> Self {
        Self {
            filter: status,
            ..Self::default()
        }
    }

    pub fn filter(&self) -> Option<Status> {
        self.filter
    }

    /// Fetch `/api/applications` and rebuild the board from it.
    pub async fn load<B: Backend>(&mut self, backend: &B) -> Result<usize, ApiError> {
        let filter = self.filter;
        let result = backend.applications(filter).await;
        *self = Self::filtered(filter);
        match result {
            Ok(jobs) => {
                for job in jobs {
                    self.place(job);
                }
                Ok(self.len())
            }
            Err(err) => {
                self.failed = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> &Column {
        // Columns are built from Status::ALL, in the same order.
        &self.columns[status as usize]
    }

    pub fn other(&self) -> &[Job] {
        &self.other
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum::<usize>() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: i64) -> Option<&Job> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .chain(self.other.iter())
            .find(|job| job.id == id)
    }

    /// Statuses the card's move menu offers: every status except its own.
    pub fn move_targets(&self, id: i64) -> Option<Vec<Status>> {
        self.find(id)
            .map(|job| manual_targets(&job.effective_status()))
    }

    /// Move a card through its move menu and re-place it from the reply.
    pub async fn move_card<B: Backend>(
        &mut self,
        engine: &Lifecycle<B>,
        id: i64,
        target: &str,
    ) -> Notice {
        let Some(job) = self.find(id) else {
            return Notice::error(format!("Job #{id} is not on the board"));
        };

        let result = engine.transition(job, target, None).await;
        match result {
            Ok(outcome) => {
                let message = outcome.describe(id);
                if let Some(updated) = outcome.into_job() {
                    self.place(updated);
                }
                Notice::info(message)
            }
            Err(err) => Notice::from(&err),
        }
    }

    /// Re-fetch one job after another view changed it and re-place its card.
    ///
    /// The job may not be on the board yet (a first transition creates the
    /// application record). A failed fetch keeps the board as it is.
    pub async fn refresh_card_by_id<B: Backend>(&mut self, backend: &B, id: i64) -> bool {
        match backend.get_job(id).await {
            Ok(job) => {
                self.place(job);
                true
            }
            Err(err) => {
                warn!(job_id = id, error = %err, "card refresh failed, keeping last known data");
                false
            }
        }
    }

    // Most recently moved cards go first, like the backend's updated_at ordering.
    fn place(&mut self, job: Job) {
        self.remove(job.id);
        let Some(status) = job.status.clone() else {
            return;
        };
        if self.filter.is_some() && status.known() != self.filter {
            return;
        }
        match status.known() {
            Some(known) => self.columns[known as usize].cards.insert(0, job),
            None => self.other.insert(0, job),
        }
    }

    fn remove(&mut self, id: i64) {
        for column in &mut self.columns {
            column.cards.retain(|job| job.id != id);
        }
        self.other.retain(|job| job.id != id);
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![match self.filter {
            Some(status) => ui::heading(&format!("Pipeline · {}", status.label())),
            None => ui::heading("Pipeline"),
        }];
        if let Some(message) = &self.failed {
            lines.push(ui::notice_line(&Notice::error(format!(
                "Could not load applications: {message}"
            ))));
            return lines;
        }

        let shown = self
            .columns
            .iter()
            .filter(|column| self.filter.is_none_or(|status| status == column.status));
        for column in shown {
            lines.push(format!(
                "{} ({})",
                ui::status_badge(&column.status.into()),
                column.cards.len()
            ));
            if column.cards.is_empty() {
                lines.push(ui::muted("  No jobs"));
            }
            lines.extend(column.cards.iter().map(render_card));
        }

        if !self.other.is_empty() {
            lines.push(format!("Other ({})", self.other.len()));
            for job in &self.other {
                lines.push(format!(
                    "{}  [{}]",
                    render_card(job),
                    ui::status_badge(&job.effective_status())
                ));
            }
        }
        lines
    }
}

fn render_card(job: &Job) -> String {
    let mut card = format!("  #{} {} · {}", job.id, job.title, job.company);
    if let Some(applied) = &job.applied_at {
        card.push_str(&ui::muted(&format!("  applied {}", ui::short_date(applied))));
    }
    card
}
