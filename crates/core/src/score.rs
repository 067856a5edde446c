use serde::{Deserialize, Serialize};

/// Exam-wide counters, maintained incrementally by the answer tracker.
///
/// `answered_count == correct_count + incorrect_count <= total_questions`
/// holds after every tracker operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub total_questions: usize,
    pub answered_count: usize,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

impl AggregateScore {
    #[must_use]
    pub fn new(total_questions: usize) -> Self {
        Self {
            total_questions,
            ..Self::default()
        }
    }

    /// Rounded share of answered questions that are correct, 0 when nothing is answered.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        score_percentage(self.correct_count, self.answered_count)
    }

    /// Share of the exam that has been answered, for progress bars.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.answered_count as f64 / self.total_questions as f64;
        fraction
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.answered_count == self.correct_count + self.incorrect_count
            && self.answered_count <= self.total_questions
    }
}

/// Point-in-time copy of the score handed to display and persistence layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: AggregateScore,
    pub score_percentage: u32,
}

impl From<AggregateScore> for ScoreSnapshot {
    fn from(score: AggregateScore) -> Self {
        Self {
            score,
            score_percentage: score.percentage(),
        }
    }
}

/// `round(100 * correct / answered)` with halves rounded up; 0 when `answered == 0`.
#[must_use]
pub fn score_percentage(correct: usize, answered: usize) -> u32 {
    if answered == 0 {
        return 0;
    }
    let correct = correct as u128;
    let answered = answered as u128;
    let rounded = (200 * correct + answered) / (2 * answered);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
