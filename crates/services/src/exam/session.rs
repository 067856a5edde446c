use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use exam_core::model::{Catalog, OptionLetter, QuestionId};
use exam_core::{AnswerTracker, ScoreObserver, ScoreSnapshot, SelectionResult};
use storage::repository::ProgressRecord;

use super::observer::{PendingSave, ScoreLogObserver};
use crate::error::ExamError;

/// In-memory exam attempt: the catalog plus its answer tracker.
///
/// Every mutation is logged and queued for persistence through tracker hooks;
/// `ExamLoopService::save_pending` drains the queue.
pub struct ExamSession {
    tracker: AnswerTracker,
    pending: PendingSave,
    previous_progress: Option<ProgressRecord>,
    started_at: DateTime<Utc>,
}

impl ExamSession {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, started_at: DateTime<Utc>) -> Self {
        Self::with_tracker(AnswerTracker::new(catalog), started_at)
    }

    /// Session with no questions, used after a failed catalog load.
    #[must_use]
    pub fn unavailable(started_at: DateTime<Utc>) -> Self {
        Self::with_tracker(AnswerTracker::empty(), started_at)
    }

    fn with_tracker(mut tracker: AnswerTracker, started_at: DateTime<Utc>) -> Self {
        let pending = PendingSave::new();
        tracker.subscribe(Box::new(ScoreLogObserver));
        tracker.subscribe(Box::new(pending.clone()));
        Self {
            tracker,
            pending,
            previous_progress: None,
            started_at,
        }
    }

    /// Attach the snapshot read from storage at startup. Display only.
    #[must_use]
    pub fn with_previous_progress(mut self, previous: Option<ProgressRecord>) -> Self {
        self.previous_progress = previous;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        self.tracker.catalog()
    }

    #[must_use]
    pub fn tracker(&self) -> &AnswerTracker {
        &self.tracker
    }

    #[must_use]
    pub fn previous_progress(&self) -> Option<&ProgressRecord> {
        self.previous_progress.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracker.total_questions() == 0
    }

    /// Register an extra post-mutation hook.
    pub fn subscribe(&mut self, observer: Box<dyn ScoreObserver>) {
        self.tracker.subscribe(observer);
    }

    /// Record an option click.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Tracker` for unknown questions or out-of-range options.
    pub fn select(
        &mut self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<SelectionResult, ExamError> {
        Ok(self.tracker.record_selection(question_id, letter)?)
    }

    #[must_use]
    pub fn score(&self) -> ScoreSnapshot {
        self.tracker.current_score()
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Handle on the latest unsaved score. Clones share the same slot.
    #[must_use]
    pub fn pending_saves(&self) -> PendingSave {
        self.pending.clone()
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("tracker", &self.tracker)
            .field("previous_progress", &self.previous_progress)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
