use std::sync::{Arc, Mutex};

use exam_core::{ScoreEvent, ScoreObserver, ScoreSnapshot};

/// Logs every score change at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreLogObserver;

impl ScoreObserver for ScoreLogObserver {
    fn on_score_change(&mut self, event: &ScoreEvent) {
        match event {
            ScoreEvent::Selected(result) => tracing::debug!(
                question = %result.question_id,
                selected = %result.selected,
                outcome = result.outcome.label(),
                answered = result.score.score.answered_count,
                correct = result.score.score.correct_count,
                incorrect = result.score.score.incorrect_count,
                "answer recorded"
            ),
            ScoreEvent::Reset(_) => tracing::debug!("answers reset"),
        }
    }
}

/// Holds the latest unsaved score until the persistence layer takes it.
#[derive(Debug, Default, Clone)]
pub struct PendingSave {
    slot: Arc<Mutex<Option<ScoreSnapshot>>>,
}

impl PendingSave {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest score not yet handed out, clearing the slot.
    #[must_use]
    pub fn take(&self) -> Option<ScoreSnapshot> {
        self.slot.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl ScoreObserver for PendingSave {
    fn on_score_change(&mut self, event: &ScoreEvent) {
        if let Ok(mut guard) = self.slot.lock() {
            *guard = Some(event.score());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::AggregateScore;

    #[test]
    fn pending_save_keeps_latest_and_clears_on_take() {
        let pending = PendingSave::new();
        let mut hook = pending.clone();
        assert!(pending.take().is_none());

        let first = ScoreSnapshot::from(AggregateScore::new(3));
        let mut second_score = AggregateScore::new(3);
        second_score.answered_count = 1;
        second_score.correct_count = 1;
        let second = ScoreSnapshot::from(second_score);

        hook.on_score_change(&ScoreEvent::Reset(first));
        hook.on_score_change(&ScoreEvent::Reset(second));
        assert_eq!(pending.take(), Some(second));
        assert!(pending.take().is_none());
    }
}
