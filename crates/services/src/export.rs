use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use exam_core::time::{date_stamp, iso_timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::exam::ExamSession;

/// Exported results document. Field names are the compatibility contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exam_title: String,
    pub timestamp: String,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub score_percentage: u32,
    pub questions: Vec<ExportedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedQuestion {
    /// 1-based position in catalog order.
    pub question_number: usize,
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub correct_answer_text: String,
    /// Serialized as `null` while unanswered.
    pub is_correct: Option<bool>,
    pub section: String,
}

impl ExportDocument {
    #[must_use]
    pub fn build(session: &ExamSession, now: DateTime<Utc>) -> Self {
        let catalog = session.catalog();
        let score = session.score();
        let answers = session.tracker().snapshot_for_export();

        let questions = catalog
            .questions_with_sections()
            .zip(answers)
            .enumerate()
            .map(|(idx, ((section, question), answer))| ExportedQuestion {
                question_number: idx + 1,
                question: question.text().trim().to_string(),
                selected_answer: answer.selected_text.trim().to_string(),
                correct_answer: answer.correct_option.to_string(),
                correct_answer_text: question.answer_line().trim().to_string(),
                is_correct: answer.is_correct,
                section: section.id().to_string(),
            })
            .collect();

        Self {
            exam_title: catalog.display_title().to_string(),
            timestamp: iso_timestamp(now),
            total_questions: score.score.total_questions,
            answered_questions: score.score.answered_count,
            correct_answers: score.score.correct_count,
            incorrect_answers: score.score.incorrect_count,
            score_percentage: score.score_percentage,
            questions,
        }
    }

    /// Two-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Download name for an export taken at `now`.
#[must_use]
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("ml_exam_results_{}.json", date_stamp(now))
}

/// Write `doc` into `dir` under [`export_file_name`].
///
/// # Errors
///
/// Returns `ExportError` if encoding or writing fails.
pub async fn write_export(
    doc: &ExportDocument,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let body = doc.to_json_pretty()?;
    let path = dir.join(export_file_name(now));
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::info!(path = %path.display(), "results exported");
    Ok(path)
}
