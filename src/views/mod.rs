//! The screens that render job data: dashboard, table, kanban board and the
//! detail panel.
//!
//! Each view owns its own state and cached jobs, renders as a pure function
//! of them, and after a successful transition patches only the affected
//! record. Views that can be touched by another view's transition expose a
//! narrow `refresh_*_by_id` operation instead of subscribing to events.

mod dashboard;
mod detail;
mod kanban;
mod notes;
mod table;

pub use dashboard::DashboardView;
pub use detail::{DetailPanel, OpenViews};
pub use kanban::{Column, KanbanView};
pub use notes::NotesEditor;
pub use table::{JobCache, TableState, TableView};

use crate::api::ApiError;
use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message produced where a user action completes or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&LifecycleError> for Notice {
    fn from(err: &LifecycleError) -> Self {
        Notice::error(err.to_string())
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Notice::error(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn plain_output() {
    console::set_colors_enabled(false);
}
