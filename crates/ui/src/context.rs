use std::path::PathBuf;
use std::sync::Arc;

use services::{CatalogSource, ExamLoopService};

pub trait UiApp: Send + Sync {
    fn exam_loop(&self) -> Arc<ExamLoopService>;
    fn catalog_source(&self) -> CatalogSource;
    fn export_dir(&self) -> PathBuf;
}

#[derive(Clone)]
pub struct AppContext {
    exam_loop: Arc<ExamLoopService>,
    catalog_source: CatalogSource,
    export_dir: PathBuf,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            exam_loop: app.exam_loop(),
            catalog_source: app.catalog_source(),
            export_dir: app.export_dir(),
        }
    }

    #[must_use]
    pub fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }

    #[must_use]
    pub fn catalog_source(&self) -> &CatalogSource {
        &self.catalog_source
    }

    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }
}

// Provided by the composition root (`crates/app`) or the view test harness.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
