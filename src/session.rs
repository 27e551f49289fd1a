//! Session runner: drives one lesson or review run from start to summary.
//!
//! Sessions are transient and owned by their initiator; an abandoned run
//! simply never produces a summary, while answers already recorded stay
//! applied to mastery records.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::RewardConfig;
use crate::models::{SessionExercise, SessionSummary};
use crate::repository::{MasteryRepository, RepositoryError};
use crate::rewards;
use crate::store::{MasteryStore, TransitionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Complete,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
    #[error("session has no exercises")]
    Empty,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One in-flight session. Answers are recorded against the current
/// exercise, `advance` steps forward, and `finalize` turns the finished run
/// into a `SessionSummary`.
#[derive(Debug)]
pub struct SessionRunner {
    learner_id: String,
    exercises: Vec<SessionExercise>,
    position: usize,
    correct_count: u32,
    total_count: u32,
    started_at: DateTime<Utc>,
    exercise_started_at: DateTime<Utc>,
    latencies_ms: Vec<i64>,
    answered_current: bool,
    phase: SessionPhase,
    finalized: bool,
    mastered_item_ids: Vec<String>,
}

impl SessionRunner {
    pub fn start(
        learner_id: impl Into<String>,
        exercises: Vec<SessionExercise>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if exercises.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            learner_id: learner_id.into(),
            exercises,
            position: 0,
            correct_count: 0,
            total_count: 0,
            started_at: now,
            exercise_started_at: now,
            latencies_ms: Vec::new(),
            answered_current: false,
            phase: SessionPhase::InProgress,
            finalized: false,
            mastered_item_ids: Vec::new(),
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn current_exercise(&self) -> Option<&SessionExercise> {
        match self.phase {
            SessionPhase::InProgress => self.exercises.get(self.position),
            SessionPhase::Complete => None,
        }
    }

    /// Latency of each answered exercise, in answer order.
    pub fn latencies_ms(&self) -> &[i64] {
        &self.latencies_ms
    }

    /// Records the answer for the current exercise and, when the exercise
    /// tracks an item, applies the mastery transition through the store.
    ///
    /// Returns the transition outcome for tracked exercises, `None` for
    /// untracked ones. Rejected with `InvalidState` once the session is
    /// complete or the current exercise was already answered.
    pub async fn record_answer<R: MasteryRepository>(
        &mut self,
        store: &MasteryStore<R>,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<TransitionOutcome>, SessionError> {
        if self.phase == SessionPhase::Complete {
            return Err(SessionError::InvalidState("session already complete"));
        }
        if self.answered_current {
            return Err(SessionError::InvalidState("exercise already answered"));
        }

        let tracked_item = self
            .current_exercise()
            .and_then(|exercise| exercise.tracked_item_id())
            .map(str::to_string);

        // The mastery write goes first: if persistence is unavailable the
        // session counters stay untouched and the caller may resubmit.
        let outcome = match tracked_item {
            Some(item_id) => {
                let outcome = store
                    .record_answer(&self.learner_id, &item_id, correct, now)
                    .await?;
                if outcome.newly_mastered() {
                    self.mastered_item_ids.push(item_id);
                }
                Some(outcome)
            }
            None => None,
        };

        self.total_count += 1;
        if correct {
            self.correct_count += 1;
        }
        self.latencies_ms
            .push((now - self.exercise_started_at).num_milliseconds().max(0));
        self.answered_current = true;

        Ok(outcome)
    }

    /// Moves to the next exercise, or completes the session after the last
    /// one. The current exercise must have been answered.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionPhase, SessionError> {
        if self.phase == SessionPhase::Complete {
            return Err(SessionError::InvalidState("session already complete"));
        }
        if !self.answered_current {
            return Err(SessionError::InvalidState("current exercise not answered"));
        }

        if self.position + 1 < self.exercises.len() {
            self.position += 1;
            self.answered_current = false;
            self.exercise_started_at = now;
            Ok(SessionPhase::InProgress)
        } else {
            self.phase = SessionPhase::Complete;
            Ok(SessionPhase::Complete)
        }
    }

    /// Produces the durable summary for a completed session. Valid exactly
    /// once.
    pub fn finalize(
        &mut self,
        config: &RewardConfig,
        base_xp: u32,
        now: DateTime<Utc>,
    ) -> Result<SessionSummary, SessionError> {
        if self.phase != SessionPhase::Complete {
            return Err(SessionError::InvalidState("session still in progress"));
        }
        if self.finalized {
            return Err(SessionError::InvalidState("session already finalized"));
        }
        self.finalized = true;

        let accuracy =
            ((self.correct_count as f64 / self.total_count as f64) * 100.0).round() as u8;
        let elapsed_seconds = (now - self.started_at).num_seconds().max(0) as u64;
        let xp_earned = rewards::compute_xp(config, base_xp, accuracy);
        let badge_events = rewards::badge_events(accuracy, xp_earned, &self.mastered_item_ids);

        info!(
            learner_id = self.learner_id.as_str(),
            accuracy,
            xp_earned,
            elapsed_seconds,
            total = self.total_count,
            "session finalized"
        );

        Ok(SessionSummary {
            accuracy,
            elapsed_seconds,
            xp_earned,
            correct_count: self.correct_count,
            total_count: self.total_count,
            badge_events,
        })
    }
}
