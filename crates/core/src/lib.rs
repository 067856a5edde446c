#![forbid(unsafe_code)]

pub mod model;
pub mod score;
pub mod time;
pub mod tracker;

pub use score::{AggregateScore, ScoreSnapshot, score_percentage};
pub use time::Clock;
pub use tracker::{
    AnswerSnapshot, AnswerTracker, NOT_ANSWERED, Outcome, QuestionState, ScoreEvent,
    ScoreObserver, SelectionResult, TrackerError,
};
