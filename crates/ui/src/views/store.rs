use std::path::PathBuf;
use std::sync::Arc;

use dioxus::prelude::*;
use exam_core::model::{OptionLetter, QuestionId};
use services::{ExamLoopService, PendingSave};

use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::{ExamViewState, ExamVm, start_exam};

pub const SAVE_FAILED: &str = "Progress could not be saved.";

/// Exam state shared by every route of the window.
#[derive(Clone, Copy)]
pub struct ExamStore {
    pub exam: Signal<Option<ExamVm>>,
    pub view: Signal<ExamViewState>,
    pub notice: Signal<Option<String>>,
    pub load: Resource<Result<(), ViewError>>,
}

impl ExamStore {
    /// Apply an option click, then save the new score in the background.
    pub fn select(self, exam_loop: &Arc<ExamLoopService>, id: QuestionId, letter: OptionLetter) {
        let mut exam = self.exam;
        let result = exam
            .write()
            .as_mut()
            .map(|vm| vm.select(exam_loop, id, letter).map(|_| vm.pending_saves()));
        match result {
            Some(Ok(saves)) => self.save(exam_loop, saves),
            Some(Err(err)) => {
                let mut notice = self.notice;
                notice.set(Some(err.message().to_string()));
            }
            None => {}
        }
    }

    /// Clear every answer and save the zeroed score.
    pub fn reset(self, exam_loop: &Arc<ExamLoopService>) {
        let mut exam = self.exam;
        let saves = exam.write().as_mut().map(|vm| {
            vm.reset(exam_loop);
            vm.pending_saves()
        });
        if let Some(saves) = saves {
            self.save(exam_loop, saves);
        }
    }

    /// Write the results file into `dir` and report where it went.
    pub fn export(self, exam_loop: &Arc<ExamLoopService>, dir: PathBuf) {
        let doc = self
            .exam
            .read()
            .as_ref()
            .map(|vm| exam_loop.export(vm.session()));
        let Some(doc) = doc else {
            return;
        };
        let exam_loop = Arc::clone(exam_loop);
        let mut notice = self.notice;
        spawn(async move {
            match exam_loop.write_export(&doc, &dir).await {
                Ok(path) => notice.set(Some(format!("Results saved to {}", path.display()))),
                Err(err) => {
                    tracing::warn!(error = %err, "export failed");
                    notice.set(Some(ViewError::Export.message().to_string()));
                }
            }
        });
    }

    // Every task goes through the service's single writer and drains the
    // latest score, so a late task never writes an older one.
    fn save(self, exam_loop: &Arc<ExamLoopService>, saves: PendingSave) {
        let exam_loop = Arc::clone(exam_loop);
        let mut notice = self.notice;
        spawn(async move {
            if exam_loop.save_pending(&saves).await {
                if notice.peek().as_deref() == Some(SAVE_FAILED) {
                    notice.set(None);
                }
            } else {
                notice.set(Some(SAVE_FAILED.to_string()));
            }
        });
    }
}

/// Create the store, start loading the catalog, and provide it to children.
pub fn use_exam_store_provider() -> ExamStore {
    let ctx = use_context::<AppContext>();
    let exam = use_signal(|| None::<ExamVm>);
    let view = use_signal(ExamViewState::default);
    let notice = use_signal(|| None::<String>);

    let load = use_resource(move || {
        let exam_loop = ctx.exam_loop();
        let source = ctx.catalog_source().clone();
        let mut exam = exam;
        async move {
            let vm = start_exam(&exam_loop, &source).await;
            exam.set(Some(vm));
            Ok::<_, ViewError>(())
        }
    });

    use_context_provider(|| ExamStore {
        exam,
        view,
        notice,
        load,
    })
}
