mod exam_vm;
mod keyboard;
mod time_fmt;
mod view_state;

pub use exam_vm::{ExamVm, OptionVm, QuestionVm, SectionVm, start_exam};
pub use keyboard::KeyCommand;
pub use time_fmt::format_datetime;
pub use view_state::{
    ANSWER_TOGGLE_TOOLTIP, ExamViewState, KeyEffect, NAVIGATION_TOGGLE_TOOLTIP, PrintPlan,
};
