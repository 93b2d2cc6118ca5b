use super::Notice;
use crate::api::{ApiError, Backend, Job, Stats};
use crate::ui;

const RECENT: usize = 5;

/// Funnel of application counts plus the most recently updated applications.
#[derive(Debug, Default)]
pub struct DashboardView {
    stats: Option<Stats>,
    recent: Vec<Job>,
    failed: Option<String>,
}

impl DashboardView {
    pub async fn load<B: Backend>(&mut self, backend: &B) -> Result<(), ApiError> {
        let loaded = async {
            let stats = backend.stats().await?;
            let mut recent = backend.applications(None).await?;
            // Backend already orders by updated_at; re-sort for ones that don't.
            recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            recent.truncate(RECENT);
            Ok::<_, ApiError>((stats, recent))
        }
        .await;

        match loaded {
            Ok((stats, recent)) => {
                *self = Self {
                    stats: Some(stats),
                    recent,
                    failed: None,
                };
                Ok(())
            }
            Err(err) => {
                *self = Self {
                    failed: Some(err.to_string()),
                    ..Self::default()
                };
                Err(err)
            }
        }
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![ui::heading("Dashboard")];
        if let Some(message) = &self.failed {
            lines.push(ui::notice_line(&Notice::error(format!(
                "Could not load stats: {message}"
            ))));
            return lines;
        }
        let Some(stats) = &self.stats else {
            lines.push(ui::muted("Loading..."));
            return lines;
        };

        lines.push(format!("Jobs found: {}", stats.total_jobs_found));
        if stats.tracked() == 0 {
            lines.push("No applications tracked yet.".to_string());
            return lines;
        }

        let widest = stats.funnel().iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);
        for (status, count) in stats.funnel() {
            let bar = "█".repeat(((count * 20).div_ceil(widest)) as usize);
            let padding = 12usize.saturating_sub(status.label().chars().count());
            lines.push(format!(
                "  {}{} {count:>4} {bar}",
                ui::status_badge(&status),
                " ".repeat(padding)
            ));
        }

        if !self.recent.is_empty() {
            lines.push(String::new());
            lines.push("Recently updated:".to_string());
            for job in &self.recent {
                lines.push(format!(
                    "  #{} {} · {}  {}",
                    job.id,
                    job.title,
                    job.company,
                    ui::status_badge(&job.effective_status())
                ));
            }
        }
        lines
    }
}
