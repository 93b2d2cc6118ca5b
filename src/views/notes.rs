use super::Notice;
use crate::api::{Backend, Job};
use crate::lifecycle::Lifecycle;

/// Edit buffer for a job's notes.
///
/// Typing only changes the buffer. The text is sent when the editor loses
/// focus ([`blur`](Self::blur)), and only if it differs from what was last
/// saved. A failed save keeps the typed text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotesEditor {
    saved: String,
    buffer: String,
}

impl NotesEditor {
    pub fn new(saved: &str) -> Self {
        Self {
            saved: saved.to_string(),
            buffer: saved.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.saved
    }

    /// Take the backend's notes as saved, keeping any unsent edits.
    pub fn sync(&mut self, saved: &str) {
        let dirty = self.is_dirty();
        self.saved = saved.to_string();
        if !dirty {
            self.buffer = self.saved.clone();
        }
    }

    /// Commit the buffer.
    ///
    /// `Ok(None)` means there was nothing to send. A failure comes back as
    /// the error notice to show; the buffer is left untouched.
    pub async fn blur<B: Backend>(
        &mut self,
        engine: &Lifecycle<B>,
        job_id: i64,
    ) -> Result<Option<Job>, Notice> {
        if !self.is_dirty() {
            return Ok(None);
        }

        match engine.update_notes(job_id, &self.buffer).await {
            Ok(job) => {
                self.saved = self.buffer.clone();
                Ok(Some(job))
            }
            Err(err) => Err(Notice::error(format!("Could not save notes: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, Endpoint, MockBackend, job};
    use crate::lifecycle::Status;

    fn setup() -> (Lifecycle<MockBackend>, MockBackend) {
        let backend = MockBackend::with_jobs(vec![job(1, Some(Status::Applied))]);
        (Lifecycle::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn typing_sends_nothing_until_blur() {
        let (engine, backend) = setup();
        let mut editor = NotesEditor::new("");

        editor.edit("h");
        editor.edit("he");
        editor.edit("hello");
        assert!(backend.calls().is_empty());

        let job = editor.blur(&engine, 1).await.unwrap().unwrap();
        assert_eq!(job.notes.as_deref(), Some("hello"));
        assert_eq!(
            backend.calls(),
            vec![Call::UpdateNotes {
                id: 1,
                notes: "hello".into()
            }]
        );
        assert!(!editor.is_dirty());
    }

    #[tokio::test]
    async fn blur_without_changes_is_silent() {
        let (engine, backend) = setup();
        let mut editor = NotesEditor::new("call Friday");
        editor.edit("call Friday");

        assert_eq!(editor.blur(&engine, 1).await, Ok(None));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_save_keeps_typed_text() {
        let (engine, backend) = setup();
        backend.fail(Endpoint::UpdateNotes, 500, "db locked");
        let mut editor = NotesEditor::new("old");
        editor.edit("new thoughts");

        let notice = editor.blur(&engine, 1).await.unwrap_err();
        assert!(notice.is_error());
        assert!(notice.message.contains("db locked"));
        assert_eq!(editor.text(), "new thoughts");
        assert!(editor.is_dirty());

        // Blurring again retries only because the user triggered it.
        backend.heal(Endpoint::UpdateNotes);
        assert!(editor.blur(&engine, 1).await.unwrap().is_some());
        assert_eq!(backend.count(|c| matches!(c, Call::UpdateNotes { .. })), 2);
    }

    #[test]
    fn sync_keeps_unsent_edits() {
        let mut editor = NotesEditor::new("a");
        editor.sync("b");
        assert_eq!(editor.text(), "b");

        editor.edit("typed");
        editor.sync("c");
        assert_eq!(editor.text(), "typed");
        assert!(editor.is_dirty());
    }
}
