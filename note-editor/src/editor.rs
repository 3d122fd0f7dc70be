use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Debouncer, NoteDraft, Result};

/// Destination for note saves.
#[async_trait]
pub trait NoteSink: Send + Sync + 'static {
    async fn update_note(&self, note_id: Uuid, text: String) -> Result<()>;
}

/// Editing session for one note. Edits are saved after the debouncer's
/// delay, coalescing bursts into a single save of the latest text.
pub struct NoteEditor<S: NoteSink> {
    note_id: Uuid,
    draft: NoteDraft,
    sink: Arc<S>,
    debouncer: Debouncer,
}

impl<S: NoteSink> NoteEditor<S> {
    pub fn new(note_id: Uuid, text: &str, sink: Arc<S>) -> Self {
        Self::with_debouncer(note_id, text, sink, Debouncer::default())
    }

    pub fn with_debouncer(note_id: Uuid, text: &str, sink: Arc<S>, debouncer: Debouncer) -> Self {
        Self {
            note_id,
            draft: NoteDraft::from_text(text),
            sink,
            debouncer,
        }
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn edit(&mut self, heading: impl Into<String>, body: impl Into<String>) {
        self.draft = NoteDraft::new(heading, body);

        let sink = self.sink.clone();
        let note_id = self.note_id;
        let text = self.draft.to_text();
        self.debouncer.schedule(async move {
            if let Err(err) = sink.update_note(note_id, text).await {
                tracing::warn!(%note_id, "failed to save note: {err}");
            }
        });
    }

    /// Saves the current draft now. A save still waiting on the timer is
    /// dropped; one already sent is awaited first so it cannot land last.
    pub async fn flush(&mut self) -> Result<()> {
        self.debouncer.cancel();
        self.debouncer.settle().await;
        self.sink.update_note(self.note_id, self.draft.to_text()).await
    }
}
