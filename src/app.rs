//! One-shot subcommands: each loads what it needs, prints, and exits.
//!
//! Read failures of a whole view render in place of its content; a read
//! needed before a mutation (the job being changed) aborts the command.
//! Mutation failures are printed as a notice. Both exit non-zero.

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use tracing::debug;

use crate::api::{ApiClient, Backend, JobQuery};
use crate::cli::{Cli, Command};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::export;
use crate::lifecycle::{
    Lifecycle, LifecycleError, Status, StatusValue, TransitionOutcome, list_statuses, suggested_next_actions,
};
use crate::poller::{PollEnd, PollEvent, SearchPoller};
use crate::shell::{self, Session};
use crate::ui::{self, SearchProgress};
use crate::views::{DashboardView, DetailPanel, KanbanView, Notice, TableState, TableView};

// The backend caps /api/jobs at 200 rows unless asked for more.
const EXPORT_LIMIT: u32 = 9999;

/// What a command printed and whether it failed.
#[derive(Debug, Default)]
pub struct Report {
    pub lines: Vec<String>,
    pub notice: Option<Notice>,
    pub failed: bool,
}

impl Report {
    fn view(lines: Vec<String>, failed: bool) -> Self {
        Self {
            lines,
            notice: None,
            failed,
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            failed: notice.is_error(),
            notice: Some(notice),
            lines: Vec::new(),
        }
    }

    pub fn print(self) -> ExitCode {
        for line in &self.lines {
            println!("{line}");
        }
        if let Some(notice) = &self.notice {
            ui::print_notice(notice);
        }
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

pub async fn run(cli: Cli, config: TrackerConfig) -> Result<ExitCode, TrackerError> {
    let client = ApiClient::new(&config.api_url, config.request_timeout())?;
    debug!(api_url = client.base_url(), "using backend");

    let report = match cli.command {
        Command::Dashboard => dashboard(&client).await,
        Command::Jobs { filters, page } => {
            jobs(&client, filters.to_query(), page, config.page_size).await
        }
        Command::Board { status } => board(&client, status).await,
        Command::Show { id } => show(&client, id).await?,
        Command::Status { id, status, notes } => {
            set_status(&Lifecycle::new(client), id, &status, notes.as_deref()).await?
        }
        Command::Act { id, label } => act(&Lifecycle::new(client), id, &label).await?,
        Command::Notes { id, text } => notes(&Lifecycle::new(client), id, &text).await,
        Command::Statuses => statuses(),
        Command::Export { output } => export(&client, &output).await?,
        Command::Search { role, detach } => {
            return search(client, role, detach, config.poll_interval()).await;
        }
        Command::Shell => {
            let state = TableState::new(JobQuery::default(), config.page_size);
            shell::run(Session::new(client, state, config.poll_interval())).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };
    Ok(report.print())
}

pub async fn dashboard<B: Backend>(backend: &B) -> Report {
    let mut view = DashboardView::default();
    let failed = view.load(backend).await.is_err();
    Report::view(view.render(), failed)
}

/// `page` counts from 1; pages past the end show the last one.
pub async fn jobs<B: Backend>(backend: &B, query: JobQuery, page: usize, page_size: usize) -> Report {
    let mut state = TableState::new(query, page_size);
    state.page = page.saturating_sub(1);
    let mut table = TableView::new(state);
    let failed = table.load(backend).await.is_err();
    Report::view(table.render(), failed)
}

pub async fn board<B: Backend>(backend: &B, status: Option<Status>) -> Report {
    let mut view = KanbanView::filtered(status);
    let failed = view.load(backend).await.is_err();
    Report::view(view.render(), failed)
}

pub async fn show<B: Backend>(backend: &B, id: i64) -> Result<Report, TrackerError> {
    match DetailPanel::open(backend, id).await {
        Ok(panel) => Ok(Report::view(panel.render(), false)),
        Err(err) if err.status_code() == Some(404) => {
            Ok(Report::notice(Notice::error(format!("Job #{id} not found"))))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn set_status<B: Backend>(
    engine: &Lifecycle<B>,
    id: i64,
    target: &str,
    notes: Option<&str>,
) -> Result<Report, TrackerError> {
    let target: Status = match target.parse() {
        Ok(status) => status,
        Err(err) => return Ok(Report::notice(Notice::from(&LifecycleError::from(err)))),
    };
    let job = engine.backend().get_job(id).await?;
    let result = engine.transition_to(&job, target, notes).await;
    Ok(Report::notice(outcome_notice(id, result)))
}

pub async fn act<B: Backend>(
    engine: &Lifecycle<B>,
    id: i64,
    label: &str,
) -> Result<Report, TrackerError> {
    let job = engine.backend().get_job(id).await?;
    let result = engine.quick_action(&job, label).await;
    let invalid = result.as_ref().is_err_and(LifecycleError::is_validation);

    let mut report = Report::notice(outcome_notice(id, result));
    if invalid {
        let available: Vec<String> = suggested_next_actions(&job.effective_status())
            .iter()
            .map(ui::action_button)
            .collect();
        report.lines.push(format!("Available actions: {}", available.join(" ")));
    }
    Ok(report)
}

pub async fn notes<B: Backend>(engine: &Lifecycle<B>, id: i64, text: &str) -> Report {
    match engine.update_notes(id, text).await {
        Ok(job) => Report::notice(Notice::info(format!("Notes saved for job #{}", job.id))),
        Err(err) => Report::notice(Notice::error(format!("Could not save notes: {err}"))),
    }
}

pub fn statuses() -> Report {
    let lines = list_statuses()
        .into_iter()
        .map(|info| {
            let badge = ui::status_badge(&StatusValue::from(info.key.to_string()));
            format!("  {:<12} {badge}", info.key)
        })
        .collect();
    Report::view(lines, false)
}

/// Write every job to `output` as CSV.
pub async fn export<B: Backend>(backend: &B, output: &Path) -> Result<Report, TrackerError> {
    let query = JobQuery {
        limit: Some(EXPORT_LIMIT),
        ..JobQuery::default()
    };
    let jobs = backend.list_jobs(&query).await?;
    if jobs.is_empty() {
        return Ok(Report::notice(Notice::info("No jobs to export.")));
    }

    let written = export::write_csv(&jobs, File::create(output)?)?;
    debug!(path = %output.display(), rows = written, "export written");
    Ok(Report::notice(Notice::info(format!(
        "Exported {written} jobs to {}",
        output.display()
    ))))
}

fn outcome_notice(id: i64, result: Result<TransitionOutcome, LifecycleError>) -> Notice {
    match result {
        Ok(outcome) => Notice::info(outcome.describe(id)),
        Err(err) => Notice::from(&err),
    }
}

/// Start a search and follow it with a spinner until it finishes.
///
/// Ctrl-C stops following; the search itself keeps running on the backend.
pub async fn search<B>(
    backend: B,
    role: Option<String>,
    detach: bool,
    interval: Duration,
) -> Result<ExitCode, TrackerError>
where
    B: Backend + Clone + Send + Sync + 'static,
{
    if role.is_none() {
        match backend.config().await {
            Ok(config) if !config.target_roles.is_empty() => {
                println!("{}", ui::muted(&format!("Roles: {}", config.target_roles.join(", "))));
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "could not read target roles"),
        }
    }

    let ack = backend.start_search(role.as_deref()).await?;
    if !ack.ok {
        let message = ack.message.unwrap_or_else(|| "Search was not started".into());
        return Ok(Report::notice(Notice::error(message)).print());
    }
    if detach {
        let message = ack.message.unwrap_or_else(|| "Search started".into());
        return Ok(Report::notice(Notice::info(message)).print());
    }

    let progress = SearchProgress::start(role.as_deref());
    let (poller, mut events) = SearchPoller::spawn(backend, interval);
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PollEvent::Progress(status)) => progress.update(&status),
                Some(PollEvent::Failed(message)) => progress.warn(&message),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                progress.dismiss();
                poller.stop().await;
                println!("{}", ui::muted("Stopped following; the search continues on the backend."));
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    match poller.join().await {
        PollEnd::Finished(status) => {
            progress.finish(&status);
            if status.progress.starts_with("Error") {
                return Ok(ExitCode::FAILURE);
            }
        }
        PollEnd::Stopped => progress.dismiss(),
    }
    Ok(ExitCode::SUCCESS)
}
