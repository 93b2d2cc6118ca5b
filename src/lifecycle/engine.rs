use tracing::{debug, info};

use super::actions::find_action;
use super::error::LifecycleError;
use super::status::Status;
use crate::api::{Backend, Job, StatusUpdate};

/// The result of asking for a status change.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The job was already in the requested status; nothing was sent.
    Unchanged,
    /// The backend accepted the change; this is its authoritative record.
    Applied(Job),
    /// The backend accepted the change but its record could not be read
    /// back. Holds the previous record with the saved status; reload to get
    /// the server-set fields.
    Unconfirmed(Job),
}

impl TransitionOutcome {
    /// The record to display after the change, if anything was sent.
    pub fn into_job(self) -> Option<Job> {
        match self {
            TransitionOutcome::Unchanged => None,
            TransitionOutcome::Applied(job) | TransitionOutcome::Unconfirmed(job) => Some(job),
        }
    }

    /// One-line summary for the notice shown after the change.
    pub fn describe(&self, id: i64) -> String {
        match self {
            TransitionOutcome::Unchanged => format!("Job #{id} unchanged"),
            TransitionOutcome::Applied(job) => {
                format!("Job #{id} → {}", job.effective_status().label())
            }
            TransitionOutcome::Unconfirmed(job) => format!(
                "Job #{id} → {} (saved; reload to see the latest details)",
                job.effective_status().label()
            ),
        }
    }
}

/// Persists status and notes changes through the backend.
///
/// Every mutation is sent exactly once. There are no retries and no
/// optimistic updates: callers only change what they display after an
/// `Ok` and always from the record the backend returned.
pub struct Lifecycle<B> {
    backend: B,
}

impl<B: Backend> Lifecycle<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Move `job` to the status named by `target`.
    ///
    /// Unknown targets fail with a validation error before anything is sent.
    pub async fn transition(
        &self,
        job: &Job,
        target: &str,
        notes: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let target: Status = target.parse()?;
        self.transition_to(job, target, notes).await
    }

    pub async fn transition_to(
        &self,
        job: &Job,
        target: Status,
        notes: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let current = job.effective_status();
        if current.is(target) {
            debug!(job_id = job.id, %target, "status already in effect");
            return Ok(TransitionOutcome::Unchanged);
        }

        let update = StatusUpdate {
            status: target,
            notes: notes.unwrap_or_default().to_string(),
        };
        let reply = self.backend.set_status(job.id, &update).await?;
        info!(job_id = job.id, from = %current, to = %target, "status updated");
        Ok(match reply {
            Some(updated) => TransitionOutcome::Applied(updated),
            None => {
                let mut saved = job.clone();
                saved.status = Some(target.into());
                TransitionOutcome::Unconfirmed(saved)
            }
        })
    }

    /// Run the suggested action labelled `label` for the job's current status.
    pub async fn quick_action(
        &self,
        job: &Job,
        label: &str,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let action = find_action(&job.effective_status(), label)?;
        self.transition_to(job, action.target, None).await
    }

    pub async fn update_notes(&self, job_id: i64, text: &str) -> Result<Job, LifecycleError> {
        let updated = self.backend.update_notes(job_id, text).await?;
        info!(job_id, "notes saved");
        Ok(updated)
    }
}
