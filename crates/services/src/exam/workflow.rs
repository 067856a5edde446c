use std::path::{Path, PathBuf};
use std::sync::Arc;

use exam_core::model::{OptionLetter, QuestionId};
use exam_core::{Clock, SelectionResult};
use storage::repository::{PROGRESS_KEY, ProgressRecord, ProgressRepository};
use tokio::sync::Mutex;

use super::observer::PendingSave;
use super::session::ExamSession;
use crate::catalog::{CatalogLoader, CatalogSource};
use crate::error::{ExamError, ExportError};
use crate::export::{ExportDocument, write_export};

/// Orchestrates exam start, answering, progress saves, and export.
///
/// Answering and resetting are synchronous and only queue the new score on the
/// session. [`ExamLoopService::save_pending`] writes it. All clones of a service
/// share one writer, so saves land in the order their scores were produced.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    loader: CatalogLoader,
    progress: Arc<dyn ProgressRepository>,
    writer: Arc<Mutex<()>>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            loader: CatalogLoader::new(clock),
            progress,
            writer: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Load the catalog and open a fresh session on it.
    ///
    /// Previously saved progress is read once and attached for display; it is
    /// never replayed into the tracker.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Catalog` if the question bank cannot be loaded.
    pub async fn start_exam(&self, source: &CatalogSource) -> Result<ExamSession, ExamError> {
        let catalog = match self.loader.load(source).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(source = %source, error = %err, "catalog load failed");
                return Err(err.into());
            }
        };
        let previous = self.load_previous_progress().await;
        Ok(ExamSession::new(Arc::new(catalog), self.clock.now()).with_previous_progress(previous))
    }

    /// Saved progress, or `None` when missing or unreadable.
    pub async fn load_previous_progress(&self) -> Option<ProgressRecord> {
        match self.progress.load_progress(PROGRESS_KEY).await {
            Ok(previous) => previous,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable saved progress");
                None
            }
        }
    }

    /// Record an option click. The new score waits in the session's pending
    /// slot until [`Self::save_pending`] runs.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Tracker` for unknown questions or out-of-range options.
    pub fn answer(
        &self,
        session: &mut ExamSession,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<SelectionResult, ExamError> {
        session.select(question_id, letter).inspect_err(|err| {
            tracing::warn!(question = %question_id, option = %letter, error = %err, "selection rejected");
        })
    }

    /// Clear every answer. The zeroed score is queued like any other change.
    pub fn reset(&self, session: &mut ExamSession) {
        session.reset();
        tracing::info!(questions = session.score().score.total_questions, "exam reset");
    }

    /// Write the latest queued score, if any.
    ///
    /// Takes the score only after acquiring the writer, so a slow write can
    /// never be followed by an older one. Returns `false` and logs when the
    /// repository rejects the write; the selection itself is never undone.
    pub async fn save_pending(&self, saves: &PendingSave) -> bool {
        let _writer = self.writer.lock().await;
        let Some(score) = saves.take() else {
            return true;
        };
        let record = ProgressRecord::from_score(&score.score, self.clock.now());
        match self.progress.save_progress(PROGRESS_KEY, &record).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to save progress");
                false
            }
        }
    }

    /// Build the export document for the session as of now.
    #[must_use]
    pub fn export(&self, session: &ExamSession) -> ExportDocument {
        ExportDocument::build(session, self.clock.now())
    }

    /// Write an export document into `dir` and return the file path.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if encoding or writing fails.
    pub async fn write_export(
        &self,
        doc: &ExportDocument,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        write_export(doc, dir, self.clock.now()).await
    }
}
