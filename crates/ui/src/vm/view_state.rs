use exam_core::model::{OptionLetter, QuestionId};

use crate::vm::{ExamVm, KeyCommand};

pub const ANSWER_TOGGLE_TOOLTIP: &str = "Show/hide all answer explanations (Shortcut: A)";
pub const NAVIGATION_TOGGLE_TOOLTIP: &str = "Show/hide navigation sidebar (Shortcut: N)";

/// Presentation flags of the exam page. Never touches scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExamViewState {
    pub answers_visible: bool,
    pub navigation_visible: bool,
    pub hovered_question: Option<QuestionId>,
    pub current_section: usize,
}

impl Default for ExamViewState {
    fn default() -> Self {
        Self {
            answers_visible: false,
            navigation_visible: true,
            hovered_question: None,
            current_section: 0,
        }
    }
}

/// What the page must do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEffect {
    Select(QuestionId, OptionLetter),
    ScrollToSection(usize),
    Redraw,
}

impl ExamViewState {
    pub fn toggle_answers(&mut self) {
        self.answers_visible = !self.answers_visible;
    }

    pub fn toggle_navigation(&mut self) {
        self.navigation_visible = !self.navigation_visible;
    }

    #[must_use]
    pub fn answer_toggle_label(&self) -> &'static str {
        if self.answers_visible {
            "Hide Answers"
        } else {
            "Show Answers"
        }
    }

    /// Move by `delta` sections, clamped to `[0, count - 1]`.
    pub fn move_section(&mut self, delta: isize, count: usize) -> usize {
        if count == 0 {
            self.current_section = 0;
            return 0;
        }
        let last = count - 1;
        let next = self.current_section.saturating_add_signed(delta).min(last);
        self.current_section = next;
        next
    }

    pub fn apply(&mut self, command: KeyCommand, exam: &ExamVm) -> Option<KeyEffect> {
        match command {
            KeyCommand::SelectOption(letter) => {
                let target = self.hovered_question.or_else(|| exam.first_question_id())?;
                letter
                    .fits(exam.option_count(target))
                    .then_some(KeyEffect::Select(target, letter))
            }
            KeyCommand::PreviousSection => {
                (exam.section_count() > 0)
                    .then(|| KeyEffect::ScrollToSection(self.move_section(-1, exam.section_count())))
            }
            KeyCommand::NextSection => {
                (exam.section_count() > 0)
                    .then(|| KeyEffect::ScrollToSection(self.move_section(1, exam.section_count())))
            }
            KeyCommand::ToggleAnswers => {
                self.toggle_answers();
                Some(KeyEffect::Redraw)
            }
            KeyCommand::ToggleNavigation => {
                self.toggle_navigation();
                Some(KeyEffect::Redraw)
            }
        }
    }
}

/// Answers are forced visible for a print job and hidden again afterwards
/// if they were hidden before.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct PrintPlan {
    restore_hidden: bool,
}

impl PrintPlan {
    pub fn begin(state: &mut ExamViewState) -> Self {
        let restore_hidden = !state.answers_visible;
        state.answers_visible = true;
        Self { restore_hidden }
    }

    pub fn finish(self, state: &mut ExamViewState) {
        if self.restore_hidden {
            state.answers_visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Catalog;
    use exam_core::time::fixed_now;
    use services::ExamSession;
    use std::sync::Arc;

    fn exam() -> ExamVm {
        let raw = r#"{ "sections": [
            { "id": "a", "title": "A", "questionRange": "1", "questions": [
                { "id": 1, "text": "?", "options": ["x", "y"], "correct": "A", "explanation": "" }
            ] },
            { "id": "b", "title": "B", "questionRange": "2", "questions": [
                { "id": 2, "text": "?", "options": ["x", "y", "z", "w"], "correct": "D", "explanation": "" }
            ] }
        ] }"#;
        let catalog = Arc::new(Catalog::from_json(raw).unwrap());
        ExamVm::new(ExamSession::new(catalog, fixed_now()))
    }

    #[test]
    fn defaults_hide_answers_and_show_navigation() {
        let state = ExamViewState::default();
        assert!(!state.answers_visible);
        assert!(state.navigation_visible);
        assert_eq!(state.answer_toggle_label(), "Show Answers");
    }

    #[test]
    fn digit_targets_first_question_when_nothing_hovered() {
        let exam = exam();
        let mut state = ExamViewState::default();
        assert_eq!(
            state.apply(KeyCommand::SelectOption(OptionLetter::B), &exam),
            Some(KeyEffect::Select(QuestionId::new(1), OptionLetter::B))
        );
        assert_eq!(state.apply(KeyCommand::SelectOption(OptionLetter::C), &exam), None);
    }

    #[test]
    fn digit_targets_hovered_question() {
        let exam = exam();
        let mut state = ExamViewState {
            hovered_question: Some(QuestionId::new(2)),
            ..ExamViewState::default()
        };
        assert_eq!(
            state.apply(KeyCommand::SelectOption(OptionLetter::D), &exam),
            Some(KeyEffect::Select(QuestionId::new(2), OptionLetter::D))
        );
    }

    #[test]
    fn section_moves_are_clamped() {
        let exam = exam();
        let mut state = ExamViewState::default();
        assert_eq!(
            state.apply(KeyCommand::PreviousSection, &exam),
            Some(KeyEffect::ScrollToSection(0))
        );
        state.apply(KeyCommand::NextSection, &exam);
        assert_eq!(
            state.apply(KeyCommand::NextSection, &exam),
            Some(KeyEffect::ScrollToSection(1))
        );
    }

    #[test]
    fn toggles_flip_flags() {
        let exam = exam();
        let mut state = ExamViewState::default();
        state.apply(KeyCommand::ToggleAnswers, &exam);
        state.apply(KeyCommand::ToggleNavigation, &exam);
        assert!(state.answers_visible);
        assert!(!state.navigation_visible);
    }

    #[test]
    fn print_restores_hidden_answers() {
        let mut state = ExamViewState::default();
        let plan = PrintPlan::begin(&mut state);
        assert!(state.answers_visible);
        plan.finish(&mut state);
        assert!(!state.answers_visible);

        state.answers_visible = true;
        let plan = PrintPlan::begin(&mut state);
        plan.finish(&mut state);
        assert!(state.answers_visible);
    }
}
