use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Catalog, OptionLetter, QuestionId, QuestionRecord};
use crate::score::{AggregateScore, ScoreSnapshot};

/// Text reported for a question that has no selection.
pub const NOT_ANSWERED: &str = "Not answered";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Contract violations from callers. Neither is retried or absorbed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("question {0} is not in the catalog")]
    NotFound(QuestionId),

    #[error("option {option} is out of range for question {id} ({option_count} options)")]
    InvalidArgument {
        id: QuestionId,
        option: OptionLetter,
        option_count: usize,
    },
}

//
// ─── QUESTION STATE ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unanswered => "Unanswered",
            Self::Correct => "Correct",
            Self::Incorrect => "Incorrect",
        }
    }
}

/// Mutable answer state for one question.
///
/// `outcome` is `Unanswered` iff `selected` is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionState {
    selected: Option<OptionLetter>,
    outcome: Outcome,
}

impl QuestionState {
    #[must_use]
    pub fn selected(&self) -> Option<OptionLetter> {
        self.selected
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

//
// ─── RESULTS & OBSERVERS ───────────────────────────────────────────────────────
//

/// Returned from `record_selection` so callers can redraw without a second read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionResult {
    pub question_id: QuestionId,
    pub selected: OptionLetter,
    pub outcome: Outcome,
    pub score: ScoreSnapshot,
}

/// Per-question export row, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSnapshot {
    pub question_id: QuestionId,
    pub selected_option: Option<OptionLetter>,
    /// Option text, or [`NOT_ANSWERED`].
    pub selected_text: String,
    pub correct_option: OptionLetter,
    /// `None` while unanswered.
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    Selected(SelectionResult),
    Reset(ScoreSnapshot),
}

impl ScoreEvent {
    #[must_use]
    pub fn score(&self) -> ScoreSnapshot {
        match self {
            Self::Selected(result) => result.score,
            Self::Reset(score) => *score,
        }
    }
}

/// Hook invoked synchronously after every tracker mutation.
pub trait ScoreObserver: Send {
    fn on_score_change(&mut self, event: &ScoreEvent);
}

impl<F> ScoreObserver for F
where
    F: FnMut(&ScoreEvent) + Send,
{
    fn on_score_change(&mut self, event: &ScoreEvent) {
        self(event);
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Sole owner of exam progress for one session.
///
/// Aggregate counters are updated by delta on each selection and never by
/// rescanning; [`AnswerTracker::recompute`] exists to check that both agree.
pub struct AnswerTracker {
    catalog: Arc<Catalog>,
    records: Vec<QuestionRecord>,
    index: HashMap<QuestionId, usize>,
    states: Vec<QuestionState>,
    score: AggregateScore,
    observers: Vec<Box<dyn ScoreObserver>>,
}

impl AnswerTracker {
    /// Start tracking a freshly loaded catalog with every question unanswered.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let records = catalog.records();
        let index = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id, pos))
            .collect();
        let states = vec![QuestionState::default(); records.len()];
        let score = AggregateScore::new(records.len());

        Self {
            catalog,
            records,
            index,
            states,
            score,
            observers: Vec::new(),
        }
    }

    /// Tracker with zero questions, used when no catalog could be loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Arc::new(Catalog::default()))
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Register a post-mutation hook. Hooks run in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn ScoreObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Record `chosen` as the answer to `question_id` and reconcile the counters.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotFound` for an unknown question and
    /// `TrackerError::InvalidArgument` when `chosen` is past the question's
    /// last option. State is untouched on error.
    pub fn record_selection(
        &mut self,
        question_id: QuestionId,
        chosen: OptionLetter,
    ) -> Result<SelectionResult, TrackerError> {
        let pos = *self
            .index
            .get(&question_id)
            .ok_or(TrackerError::NotFound(question_id))?;
        let record = self.records[pos];
        if !chosen.fits(record.option_count) {
            return Err(TrackerError::InvalidArgument {
                id: question_id,
                option: chosen,
                option_count: record.option_count,
            });
        }

        let prior = self.states[pos].outcome;
        let is_correct_now = chosen == record.correct_option;

        match (prior, is_correct_now) {
            (Outcome::Unanswered, true) => {
                self.score.correct_count += 1;
                self.score.answered_count += 1;
            }
            (Outcome::Unanswered, false) => {
                self.score.incorrect_count += 1;
                self.score.answered_count += 1;
            }
            (Outcome::Incorrect, true) => {
                self.score.correct_count += 1;
                self.score.incorrect_count -= 1;
            }
            (Outcome::Correct, false) => {
                self.score.incorrect_count += 1;
                self.score.correct_count -= 1;
            }
            // Same correctness as before, including re-clicking the same option.
            (Outcome::Correct, true) | (Outcome::Incorrect, false) => {}
        }

        let outcome = if is_correct_now {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.states[pos] = QuestionState {
            selected: Some(chosen),
            outcome,
        };

        let result = SelectionResult {
            question_id,
            selected: chosen,
            outcome,
            score: self.current_score(),
        };
        self.notify(&ScoreEvent::Selected(result));
        Ok(result)
    }

    /// Snapshot of the counters plus the derived percentage.
    #[must_use]
    pub fn current_score(&self) -> ScoreSnapshot {
        ScoreSnapshot::from(self.score)
    }

    /// Counters rebuilt from scratch out of the per-question states.
    #[must_use]
    pub fn recompute(&self) -> AggregateScore {
        let mut score = AggregateScore::new(self.records.len());
        for state in &self.states {
            match state.outcome {
                Outcome::Unanswered => {}
                Outcome::Correct => {
                    score.correct_count += 1;
                    score.answered_count += 1;
                }
                Outcome::Incorrect => {
                    score.incorrect_count += 1;
                    score.answered_count += 1;
                }
            }
        }
        score
    }

    /// Return every question to `Unanswered` and zero the counters.
    pub fn reset(&mut self) {
        self.states.fill(QuestionState::default());
        self.score = AggregateScore::new(self.records.len());
        let score = self.current_score();
        self.notify(&ScoreEvent::Reset(score));
    }

    #[must_use]
    pub fn question_state(&self, question_id: QuestionId) -> Option<QuestionState> {
        self.index.get(&question_id).map(|&pos| self.states[pos])
    }

    #[must_use]
    pub fn outcome(&self, question_id: QuestionId) -> Outcome {
        self.question_state(question_id)
            .map_or(Outcome::Unanswered, |state| state.outcome)
    }

    #[must_use]
    pub fn selected(&self, question_id: QuestionId) -> Option<OptionLetter> {
        self.question_state(question_id).and_then(|state| state.selected)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.records.len()
    }

    /// Read-only rows for an exporter, one per question in catalog order.
    #[must_use]
    pub fn snapshot_for_export(&self) -> Vec<AnswerSnapshot> {
        self.catalog
            .questions()
            .zip(self.states.iter())
            .map(|(question, state)| {
                let selected_text = state
                    .selected
                    .and_then(|letter| question.option_text(letter))
                    .unwrap_or(NOT_ANSWERED)
                    .to_string();
                AnswerSnapshot {
                    question_id: question.id(),
                    selected_option: state.selected,
                    selected_text,
                    correct_option: question.correct(),
                    is_correct: match state.outcome {
                        Outcome::Unanswered => None,
                        Outcome::Correct => Some(true),
                        Outcome::Incorrect => Some(false),
                    },
                }
            })
            .collect()
    }

    fn notify(&mut self, event: &ScoreEvent) {
        for observer in &mut self.observers {
            observer.on_score_change(event);
        }
    }
}

impl Default for AnswerTracker {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for AnswerTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerTracker")
            .field("questions", &self.records.len())
            .field("score", &self.score)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
