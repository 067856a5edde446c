use chrono::{DateTime, Utc};
use exam_core::Outcome;
use exam_core::model::{OptionLetter, Question, QuestionId, Section};
use services::{CatalogSource, ExamLoopService, ExamSession, ExportDocument, PendingSave};

use crate::views::ViewError;
use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub letter: OptionLetter,
    pub text: String,
    pub selected: bool,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub label: String,
    pub text: String,
    pub status: Outcome,
    pub status_class: &'static str,
    pub answer_line: String,
    pub options: Vec<OptionVm>,
}

impl QuestionVm {
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionVm {
    pub id: String,
    pub css_token: String,
    pub title: String,
    pub heading: String,
    pub questions: Vec<QuestionVm>,
}

/// Render-side wrapper around an exam session.
pub struct ExamVm {
    session: ExamSession,
    load_error: Option<String>,
}

impl ExamVm {
    #[must_use]
    pub fn new(session: ExamSession) -> Self {
        Self {
            session,
            load_error: None,
        }
    }

    /// Empty exam that only shows why loading failed.
    #[must_use]
    pub fn failed(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            session: ExamSession::unavailable(at),
            load_error: Some(message.into()),
        }
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.session.catalog().display_title()
    }

    #[must_use]
    pub fn sections(&self) -> Vec<SectionVm> {
        self.session
            .catalog()
            .sections()
            .iter()
            .map(|section| self.map_section(section))
            .collect()
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.session.catalog().sections().len()
    }

    #[must_use]
    pub fn section_anchor(&self, index: usize) -> Option<String> {
        self.session
            .catalog()
            .sections()
            .get(index)
            .map(|section| section.id().to_string())
    }

    #[must_use]
    pub fn first_question_id(&self) -> Option<QuestionId> {
        self.session.catalog().questions().next().map(Question::id)
    }

    #[must_use]
    pub fn option_count(&self, id: QuestionId) -> usize {
        self.session
            .catalog()
            .question(id)
            .map_or(0, |question| question.options().len())
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.session.score().score.total_questions
    }

    /// `answered/total`.
    #[must_use]
    pub fn progress_label(&self) -> String {
        let score = self.session.score().score;
        format!("{}/{}", score.answered_count, score.total_questions)
    }

    /// Width of the progress fill, 0–100.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.session.score().score.progress_fraction() * 100.0
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.session.score().score.correct_count
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.session.score().score.incorrect_count
    }

    #[must_use]
    pub fn score_label(&self) -> String {
        format!("{}%", self.session.score().score_percentage)
    }

    #[must_use]
    pub fn previous_progress_label(&self) -> Option<String> {
        self.session.previous_progress().map(|previous| {
            format!(
                "Last saved {}: {} answered, {} correct, {} incorrect",
                format_datetime(previous.timestamp),
                previous.answered_questions,
                previous.correct_answers,
                previous.incorrect_answers
            )
        })
    }

    #[must_use]
    pub fn export_preview(&self, exam_loop: &ExamLoopService) -> ExportDocument {
        exam_loop.export(&self.session)
    }

    /// Slot the next `save_pending` call drains.
    #[must_use]
    pub fn pending_saves(&self) -> PendingSave {
        self.session.pending_saves()
    }

    /// Record a click. The new score is queued on [`Self::pending_saves`].
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the click does not match a question option.
    pub fn select(
        &mut self,
        exam_loop: &ExamLoopService,
        id: QuestionId,
        letter: OptionLetter,
    ) -> Result<Outcome, ViewError> {
        exam_loop
            .answer(&mut self.session, id, letter)
            .map(|result| result.outcome)
            .map_err(|_| ViewError::Unknown)
    }

    /// Clear every answer and queue the zeroed score.
    pub fn reset(&mut self, exam_loop: &ExamLoopService) {
        exam_loop.reset(&mut self.session);
    }

    fn map_section(&self, section: &Section) -> SectionVm {
        SectionVm {
            id: section.id().to_string(),
            css_token: section.id().css_token(),
            title: section.title().to_string(),
            heading: section.heading(),
            questions: section
                .questions()
                .iter()
                .map(|question| self.map_question(question))
                .collect(),
        }
    }

    fn map_question(&self, question: &Question) -> QuestionVm {
        let tracker = self.session.tracker();
        let status = tracker.outcome(question.id());
        let selected = tracker.selected(question.id());
        let options = question
            .lettered_options()
            .map(|(letter, text)| {
                let is_selected = selected == Some(letter);
                let class = match (is_selected, status) {
                    (true, Outcome::Correct) => "option selected correct",
                    (true, Outcome::Incorrect) => "option selected incorrect",
                    _ => "option",
                };
                OptionVm {
                    letter,
                    text: text.to_string(),
                    selected: is_selected,
                    class,
                }
            })
            .collect();

        QuestionVm {
            id: question.id(),
            label: format!("Q{}", question.id()),
            text: question.text().to_string(),
            status,
            status_class: match status {
                Outcome::Unanswered => "question-status status-unanswered",
                Outcome::Correct => "question-status status-correct",
                Outcome::Incorrect => "question-status status-incorrect",
            },
            answer_line: question.answer_line(),
            options,
        }
    }
}

/// Open an exam. Catalog failures become a failed VM instead of an error.
pub async fn start_exam(exam_loop: &ExamLoopService, source: &CatalogSource) -> ExamVm {
    match exam_loop.start_exam(source).await {
        Ok(session) => ExamVm::new(session),
        Err(err) => ExamVm::failed(err.to_string(), exam_loop.clock().now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Catalog;
    use exam_core::time::fixed_now;
    use exam_core::Clock;
    use std::sync::Arc;
    use storage::repository::InMemoryRepository;

    fn vm() -> ExamVm {
        let raw = r#"{ "metadata": { "title": "VM Exam" }, "sections": [
            { "id": "part-one", "title": "Part One", "questionRange": "1-2", "questions": [
                { "id": 7, "text": "Seven?", "options": ["yes", "no"], "correct": "A", "explanation": "Yes." },
                { "id": 8, "text": "Eight?", "options": ["yes", "no", "maybe"], "correct": "C", "explanation": "Maybe." }
            ] }
        ] }"#;
        let catalog = Arc::new(Catalog::from_json(raw).unwrap());
        ExamVm::new(ExamSession::new(catalog, fixed_now()))
    }

    fn exam_loop() -> ExamLoopService {
        ExamLoopService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()))
    }

    #[test]
    fn unanswered_status_has_its_own_class() {
        let mut vm = vm();
        let question = &vm.sections()[0].questions[0];
        assert_eq!(question.status_class, "question-status status-unanswered");

        vm.select(&exam_loop(), QuestionId::new(7), OptionLetter::A).unwrap();
        let sections = vm.sections();
        assert_eq!(sections[0].questions[0].status_class, "question-status status-correct");
        assert_eq!(sections[0].questions[1].status_class, "question-status status-unanswered");
    }

    #[test]
    fn maps_sections_and_questions() {
        let vm = vm();
        let sections = vm.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Part One (Questions 1-2)");
        assert_eq!(sections[0].css_token, "part-one");

        let question = &sections[0].questions[1];
        assert_eq!(question.label, "Q8");
        assert_eq!(question.status_label(), "Unanswered");
        assert_eq!(question.answer_line, "C) Maybe.");
        assert_eq!(question.options.len(), 3);
        assert_eq!(question.options[2].letter, OptionLetter::C);
        assert_eq!(vm.progress_label(), "0/2");
        assert_eq!(vm.score_label(), "0%");
    }

    #[test]
    fn selection_updates_labels_and_classes() {
        let mut vm = vm();

        let outcome = vm
            .select(&exam_loop(), QuestionId::new(7), OptionLetter::B)
            .unwrap();
        assert_eq!(outcome, Outcome::Incorrect);
        let pending = vm.pending_saves().take().expect("score to persist");
        assert_eq!(pending.score.incorrect_count, 1);

        let question = &vm.sections()[0].questions[0];
        assert_eq!(question.status_label(), "Incorrect");
        assert_eq!(question.options[1].class, "option selected incorrect");
        assert_eq!(question.options[0].class, "option");
        assert_eq!(vm.progress_label(), "1/2");
        assert!((vm.progress_percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(vm.incorrect_count(), 1);
    }

    #[test]
    fn unknown_option_maps_to_view_error() {
        let mut vm = vm();
        let err = vm
            .select(&exam_loop(), QuestionId::new(7), OptionLetter::D)
            .unwrap_err();
        assert_eq!(err, ViewError::Unknown);
    }

    #[test]
    fn reset_queues_zeroed_score() {
        let mut vm = vm();
        let exam_loop = exam_loop();
        vm.select(&exam_loop, QuestionId::new(8), OptionLetter::C).unwrap();
        vm.reset(&exam_loop);
        let zeroed = vm.pending_saves().take().expect("reset score");
        assert_eq!(zeroed.score.answered_count, 0);
        assert_eq!(vm.progress_label(), "0/2");
    }

    #[test]
    fn export_preview_follows_selection() {
        let mut vm = vm();
        let exam_loop = exam_loop();
        vm.select(&exam_loop, QuestionId::new(8), OptionLetter::C).unwrap();
        let doc = vm.export_preview(&exam_loop);
        assert_eq!(doc.exam_title, "VM Exam");
        assert_eq!(doc.questions[0].selected_answer, "Not answered");
        assert_eq!(doc.questions[1].is_correct, Some(true));
    }

    #[tokio::test]
    async fn failed_start_keeps_error_message() {
        let source = CatalogSource::File("/missing/questions.json".into());
        let vm = start_exam(&exam_loop(), &source).await;
        assert!(vm.load_error().is_some());
        assert_eq!(vm.total_questions(), 0);
        assert!(vm.sections().is_empty());
        assert_eq!(vm.first_question_id(), None);
    }
}
