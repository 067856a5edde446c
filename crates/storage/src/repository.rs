use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::AggregateScore;
use exam_core::time::iso_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Fixed key the progress snapshot is stored under.
pub const PROGRESS_KEY: &str = "mlExamProgress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of exam progress: counters plus when they were written.
///
/// Field names follow the stored JSON (`answeredQuestions`, `correctAnswers`,
/// `incorrectAnswers`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub answered_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    #[serde(with = "millis_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// `timestamp` is written as `2023-11-14T22:13:20.000Z`, the same shape as the
/// export document. Any RFC 3339 value is accepted on read.
mod millis_timestamp {
    use super::iso_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&iso_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

impl ProgressRecord {
    #[must_use]
    pub fn from_score(score: &AggregateScore, timestamp: DateTime<Utc>) -> Self {
        Self {
            answered_questions: score.answered_count,
            correct_answers: score.correct_count,
            incorrect_answers: score.incorrect_count,
            timestamp,
        }
    }

    /// Encode for a key-value slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// Decode a key-value slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed values.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Repository contract for the progress snapshot.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressRecord>, StorageError>;

    /// Overwrite the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save_progress(&self, key: &str, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Values are kept as encoded JSON, the same way the `SQLite` adapter keeps them.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value without validation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressRecord>, StorageError> {
        self.raw(key)?
            .map(|raw| ProgressRecord::from_json(&raw))
            .transpose()
    }

    async fn save_progress(&self, key: &str, record: &ProgressRecord) -> Result<(), StorageError> {
        let encoded = record.to_json()?;
        self.insert_raw(key, &encoded)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
