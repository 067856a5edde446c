#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod exam;
pub mod export;

pub use exam_core::Clock;

pub use catalog::{CatalogLoader, CatalogSource, DEFAULT_CATALOG_FILE, resolve_catalog_url};
pub use error::{CatalogLoadError, ExamError, ExportError};
pub use exam::{ExamLoopService, ExamSession, PendingSave, ScoreLogObserver};
pub use export::{ExportDocument, ExportedQuestion, export_file_name};
