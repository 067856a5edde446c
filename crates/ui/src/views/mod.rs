mod exam;
mod results;
mod state;
mod store;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use exam::ExamView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use store::{ExamStore, use_exam_store_provider};
