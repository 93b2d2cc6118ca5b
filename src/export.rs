//! CSV export of every job the backend knows about.

use std::io;

use serde::Serialize;

use crate::api::Job;
use crate::error::TrackerError;

/// Where `jobtrail export` writes when no `--output` is given.
pub const DEFAULT_EXPORT_FILE: &str = "jobs_export.csv";

/// One CSV row. Field order is the column order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: i64,
    title: &'a str,
    company: &'a str,
    location: Option<&'a str>,
    url: Option<&'a str>,
    date_posted: Option<&'a str>,
    source: Option<&'a str>,
    salary: Option<&'a str>,
    salary_min: Option<&'a str>,
    salary_max: Option<&'a str>,
    employment_type: Option<&'a str>,
    is_remote: u8,
    experience_level: Option<&'a str>,
    apply_deadline: Option<&'a str>,
    score: Option<i64>,
    app_status: Option<String>,
    app_notes: Option<&'a str>,
}

impl<'a> From<&'a Job> for ExportRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            id: job.id,
            title: &job.title,
            company: &job.company,
            location: job.location.as_deref(),
            url: job.url.as_deref(),
            date_posted: job.date_posted.as_deref(),
            source: job.source.as_deref(),
            salary: job.salary.as_deref(),
            salary_min: job.salary_min.as_deref(),
            salary_max: job.salary_max.as_deref(),
            employment_type: job.employment_type.as_deref(),
            is_remote: u8::from(job.is_remote),
            experience_level: job.experience_level.as_deref(),
            apply_deadline: job.apply_deadline.as_deref(),
            score: job.score,
            app_status: job.status.clone().map(String::from),
            app_notes: job.notes.as_deref(),
        }
    }
}

/// Write a header row and one row per job. Returns the number of rows.
pub fn write_csv<W: io::Write>(jobs: &[Job], out: W) -> Result<usize, TrackerError> {
    let mut writer = csv::Writer::from_writer(out);
    for job in jobs {
        writer.serialize(ExportRow::from(job))?;
    }
    writer.flush()?;
    Ok(jobs.len())
}
