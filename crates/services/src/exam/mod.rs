mod observer;
mod session;
mod workflow;

// Public API of the exam subsystem.
pub use crate::error::ExamError;
pub use observer::{PendingSave, ScoreLogObserver};
pub use session::ExamSession;
pub use workflow::ExamLoopService;
