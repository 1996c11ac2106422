use std::sync::Arc;

use course_core::model::{
    ActivityId, ContentBundle, ItemRef, LectureId, PersistedProgress, Progress, ProgressState,
};
use storage::ProgressStore;

use crate::error::PersistedStateParseError;

/// Result of a mark call: whether the set grew, and the recomputed progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub newly_marked: bool,
    pub progress: Progress,
}

/// Owns the completion sets, keeps them persisted and derives progress.
///
/// Every mutating call inserts, writes the full state and recomputes progress
/// before returning, so holders of `&ProgressTracker` never see a partial update.
pub struct ProgressTracker {
    store: Arc<dyn ProgressStore>,
    key: String,
    content: Arc<ContentBundle>,
    state: ProgressState,
    progress: Progress,
}

impl ProgressTracker {
    /// Restore persisted progress for `content`.
    ///
    /// Missing, unreadable or unparseable data all fall back to an empty state;
    /// identifiers that no longer exist in `content` are dropped.
    pub async fn restore(
        store: Arc<dyn ProgressStore>,
        key: impl Into<String>,
        content: Arc<ContentBundle>,
    ) -> Self {
        let key = key.into();
        let mut state = match store.get(&key).await {
            Ok(Some(raw)) => match Self::parse_persisted(&raw) {
                Ok(state) => state,
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "discarding persisted progress");
                    ProgressState::new()
                }
            },
            Ok(None) => ProgressState::new(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "could not read persisted progress");
                ProgressState::new()
            }
        };

        let dropped = state.retain_known(&content);
        if dropped > 0 {
            tracing::warn!(dropped, "persisted progress referenced unknown items");
        }

        let progress = Progress::compute(&content, &state);
        tracing::info!(
            current = progress.current,
            total = progress.total,
            percent = progress.percent,
            "progress restored"
        );

        Self {
            store,
            key,
            content,
            state,
            progress,
        }
    }

    /// Parse a persisted blob; absent fields are empty sets.
    ///
    /// # Errors
    ///
    /// Returns `PersistedStateParseError` if the blob is not the expected JSON shape.
    pub fn parse_persisted(raw: &str) -> Result<ProgressState, PersistedStateParseError> {
        let persisted: PersistedProgress = serde_json::from_str(raw)?;
        Ok(ProgressState::from(persisted))
    }

    pub async fn mark_lecture_read(&mut self, id: LectureId) -> MarkOutcome {
        self.mark(ItemRef::Lecture(id)).await
    }

    pub async fn mark_activity_read(&mut self, id: ActivityId) -> MarkOutcome {
        self.mark(ItemRef::Activity(id)).await
    }

    pub async fn mark_flashcard_visited(&mut self, index: usize) -> MarkOutcome {
        self.mark(ItemRef::Flashcard(index)).await
    }

    pub async fn mark_question_correct(&mut self, index: usize) -> MarkOutcome {
        self.mark(ItemRef::Question(index)).await
    }

    /// Idempotently record `item` as done, persist, and recompute progress.
    ///
    /// Items that do not exist in the loaded content are ignored. A failed
    /// write is logged; the in-memory state keeps the insert.
    pub async fn mark(&mut self, item: ItemRef) -> MarkOutcome {
        if !self.content.contains(item) {
            tracing::warn!(%item, "ignoring mark for unknown item");
            return MarkOutcome {
                newly_marked: false,
                progress: self.progress,
            };
        }

        let newly_marked = self.state.insert(item);
        self.persist().await;
        self.progress = self.compute_progress();

        tracing::debug!(%item, newly_marked, percent = self.progress.percent, "item marked");
        MarkOutcome {
            newly_marked,
            progress: self.progress,
        }
    }

    async fn persist(&self) {
        let blob = match serde_json::to_string(&self.state.to_persisted()) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize progress");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.key, &blob).await {
            tracing::warn!(key = %self.key, error = %err, "could not persist progress");
        }
    }

    /// Progress as a pure function of the content and the current sets.
    #[must_use]
    pub fn compute_progress(&self) -> Progress {
        Progress::compute(&self.content, &self.state)
    }

    /// Progress as of the last mutation.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn is_done(&self, item: ItemRef) -> bool {
        self.state.contains(item)
    }

    #[must_use]
    pub fn is_lecture_read(&self, id: LectureId) -> bool {
        self.is_done(ItemRef::Lecture(id))
    }

    #[must_use]
    pub fn is_activity_read(&self, id: ActivityId) -> bool {
        self.is_done(ItemRef::Activity(id))
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}
