use tracing::warn;

use super::kanban::KanbanView;
use super::notes::NotesEditor;
use super::table::TableView;
use super::Notice;
use crate::api::{ApiError, Backend, Job};
use crate::lifecycle::{Lifecycle, Status, manual_targets};
use crate::ui;

/// Other views currently on screen that may show the panel's job.
///
/// The panel does not own their state; after a transition it only asks
/// each of them to refresh that one job.
#[derive(Default)]
pub struct OpenViews<'a> {
    pub table: Option<&'a mut TableView>,
    pub board: Option<&'a mut KanbanView>,
}

/// Full view of a single job with a status selector and a notes editor.
#[derive(Debug)]
pub struct DetailPanel {
    job: Job,
    notes: NotesEditor,
}

impl DetailPanel {
    pub async fn open<B: Backend>(backend: &B, id: i64) -> Result<Self, ApiError> {
        let job = backend.get_job(id).await?;
        Ok(Self::from_job(job))
    }

    pub fn from_job(job: Job) -> Self {
        let notes = NotesEditor::new(job.notes_text());
        Self { job, notes }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn notes(&self) -> &NotesEditor {
        &self.notes
    }

    /// The selector offers every status other than the current one.
    pub fn status_options(&self) -> Vec<Status> {
        manual_targets(&self.job.effective_status())
    }

    /// Change the job's status from the selector.
    ///
    /// On success the panel adopts the returned record and asks every open
    /// view to refresh this job.
    pub async fn change_status<B: Backend>(
        &mut self,
        engine: &Lifecycle<B>,
        target: &str,
        views: OpenViews<'_>,
    ) -> Notice {
        let result = engine.transition(&self.job, target, None).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return Notice::from(&err),
        };
        let id = self.job.id;
        let message = outcome.describe(id);
        let Some(updated) = outcome.into_job() else {
            return Notice::info(message);
        };
        self.adopt(updated);

        if let Some(table) = views.table {
            table.refresh_row_by_id(engine.backend(), id).await;
        }
        if let Some(board) = views.board {
            board.refresh_card_by_id(engine.backend(), id).await;
        }
        Notice::info(message)
    }

    pub fn edit_notes(&mut self, text: impl Into<String>) {
        self.notes.edit(text);
    }

    /// The notes editor lost focus: save if the text changed.
    pub async fn blur_notes<B: Backend>(&mut self, engine: &Lifecycle<B>) -> Option<Notice> {
        match self.notes.blur(engine, self.job.id).await {
            Ok(None) => None,
            Ok(Some(job)) => {
                self.adopt(job);
                Some(Notice::info("Notes saved"))
            }
            Err(notice) => Some(notice),
        }
    }

    /// Re-fetch the job after another view changed it. Keeps the current
    /// record if the fetch fails.
    pub async fn refresh<B: Backend>(&mut self, backend: &B) -> bool {
        match backend.get_job(self.job.id).await {
            Ok(job) => {
                self.adopt(job);
                true
            }
            Err(err) => {
                warn!(job_id = self.job.id, error = %err, "detail refresh failed");
                false
            }
        }
    }

    // Description is only on the full record; keep ours if a reply lacks it.
    fn adopt(&mut self, mut job: Job) {
        if job.description.is_none() {
            job.description = self.job.description.take();
        }
        self.notes.sync(job.notes_text());
        self.job = job;
    }

    pub fn render(&self) -> Vec<String> {
        let job = &self.job;
        let status = job.effective_status();
        let mut lines = vec![
            ui::heading(&format!("Job #{}: {}", job.id, job.title)),
            format!(
                "{}  |  {}  |  {}",
                job.company,
                job.location.as_deref().unwrap_or("—"),
                ui::status_badge(&status)
            ),
        ];

        let facts = [
            ("Source", job.source.clone()),
            ("Posted", job.date_posted.clone()),
            ("Employment", job.employment_type.clone()),
            ("Salary", job.salary.clone()),
            ("Experience", job.experience_level.clone()),
            ("Deadline", job.apply_deadline.clone()),
            ("Score", Some(job.score().to_string())),
            ("Remote", Some(if job.is_remote { "yes" } else { "no" }.to_string())),
            ("Apply URL", job.url.clone()),
            ("Applied on", job.applied_at.as_deref().map(ui::short_date)),
            ("Followed up", job.followed_up.as_deref().map(ui::short_date)),
            ("Interview", job.interview_at.as_deref().map(ui::short_date)),
        ];
        for (label, value) in facts {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                lines.push(format!("  {:<12} {value}", ui::muted(label)));
            }
        }

        if !job.is_tracked() {
            lines.push(ui::muted("  Not tracked yet; any status change starts the application."));
        }

        let options: Vec<&str> = self.status_options().iter().map(|s| s.key()).collect();
        lines.push(format!("  Move to: {}", options.join(", ")));

        let marker = if self.notes.is_dirty() { " (unsaved)" } else { "" };
        lines.push(format!("  Notes{marker}: {}", self.notes.text()));

        if let Some(description) = &job.description {
            lines.push(String::new());
            lines.extend(description.lines().take(30).map(str::to_string));
        }
        lines
    }
}
