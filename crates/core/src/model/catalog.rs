use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{QuestionId, SectionId};
use crate::model::option::OptionLetter;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(String),

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {id} has {count} options; at most 4 are supported")]
    TooManyOptions { id: QuestionId, count: usize },

    #[error("question {id} has an invalid correct option {raw:?}")]
    InvalidCorrectOption { id: QuestionId, raw: String },

    #[error("question {id} marks {correct} correct but only has {count} options")]
    CorrectOptionOutOfRange {
        id: QuestionId,
        correct: OptionLetter,
        count: usize,
    },
}

//
// ─── RAW DOCUMENT ──────────────────────────────────────────────────────────────
//

/// Wire shape of the question bank. Missing collections default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    question_range: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawQuestion {
    id: QuestionId,
    #[serde(default)]
    text: String,
    #[serde(default)]
    options: Vec<String>,
    correct: String,
    #[serde(default)]
    explanation: String,
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The immutable fields the answer tracker needs from a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub correct_option: OptionLetter,
    pub option_count: usize,
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct: OptionLetter,
    explanation: String,
}

impl Question {
    /// Build a question, validating option count and the correct letter.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if there are no options, more than four, or the
    /// correct letter points past the last option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct: OptionLetter,
        explanation: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        if options.is_empty() {
            return Err(CatalogError::NoOptions(id));
        }
        if options.len() > OptionLetter::MAX_OPTIONS {
            return Err(CatalogError::TooManyOptions {
                id,
                count: options.len(),
            });
        }
        if !correct.fits(options.len()) {
            return Err(CatalogError::CorrectOptionOutOfRange {
                id,
                correct,
                count: options.len(),
            });
        }

        Ok(Self {
            id,
            text: text.into(),
            options,
            correct,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Options paired with their letters, in display order.
    pub fn lettered_options(&self) -> impl Iterator<Item = (OptionLetter, &str)> {
        OptionLetter::ALL
            .into_iter()
            .zip(self.options.iter().map(String::as_str))
    }

    #[must_use]
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(letter.index()).map(String::as_str)
    }

    #[must_use]
    pub fn correct(&self) -> OptionLetter {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// The revealed answer line, e.g. `B) because ...`.
    #[must_use]
    pub fn answer_line(&self) -> String {
        format!("{}) {}", self.correct, self.explanation)
    }

    #[must_use]
    pub fn record(&self) -> QuestionRecord {
        QuestionRecord {
            id: self.id,
            correct_option: self.correct,
            option_count: self.options.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    title: String,
    question_range: String,
    questions: Vec<Question>,
}

impl Section {
    #[must_use]
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        question_range: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            question_range: question_range.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn question_range(&self) -> &str {
        &self.question_range
    }

    /// Header text shown above the section's questions.
    #[must_use]
    pub fn heading(&self) -> String {
        format!("{} (Questions {})", self.title, self.question_range)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// A loaded, validated question bank.
///
/// Question ids are unique across all sections; catalog order is section order
/// followed by question order within each section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    title: Option<String>,
    sections: Vec<Section>,
}

impl Catalog {
    pub const DEFAULT_TITLE: &'static str = "Exam";

    /// Build a catalog from validated sections.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateQuestion` when two questions share an id.
    pub fn new(title: Option<String>, sections: Vec<Section>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for question in sections.iter().flat_map(|s| s.questions.iter()) {
            if !seen.insert(question.id) {
                return Err(CatalogError::DuplicateQuestion(question.id));
            }
        }
        Ok(Self { title, sections })
    }

    /// Parse and validate a JSON question bank.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and the validation
    /// variants for structurally invalid questions.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let doc: RawCatalog =
            serde_json::from_str(raw).map_err(|err| CatalogError::Parse(err.to_string()))?;

        let mut sections = Vec::with_capacity(doc.sections.len());
        for raw_section in doc.sections {
            let mut questions = Vec::with_capacity(raw_section.questions.len());
            for q in raw_section.questions {
                let correct =
                    q.correct
                        .parse::<OptionLetter>()
                        .map_err(|_| CatalogError::InvalidCorrectOption {
                            id: q.id,
                            raw: q.correct.clone(),
                        })?;
                questions.push(Question::new(q.id, q.text, q.options, correct, q.explanation)?);
            }
            sections.push(Section::new(
                SectionId::new(raw_section.id),
                raw_section.title,
                raw_section.question_range,
                questions,
            ));
        }

        Self::new(doc.metadata.title, sections)
    }

    /// Title from the metadata block, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title for display and export, falling back to `"Exam"`.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or(Self::DEFAULT_TITLE)
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All questions in catalog order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// All questions in catalog order, paired with their section.
    pub fn questions_with_sections(&self) -> impl Iterator<Item = (&Section, &Question)> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter().map(move |q| (s, q)))
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question_count() == 0
    }

    /// Tracker records for every question, in catalog order.
    #[must_use]
    pub fn records(&self) -> Vec<QuestionRecord> {
        self.questions().map(Question::record).collect()
    }
}
