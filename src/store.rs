//! Mastery record store: the retention state machine for one
//! (learner, item) pair.
//!
//! Streak thresholds promote through `learning -> reviewing -> mastered`;
//! any incorrect answer resets the streak and demotes to `learning` without
//! erasing the record's history. Lesson answers and review answers go
//! through the same transition.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::events::{TransitionEvent, TransitionEvents};
use crate::models::{MasteryRecord, MasteryStatus};
use crate::repository::{MasteryRepository, RepositoryError};
use crate::scheduler;

/// Streak at which a record is promoted to `reviewing`.
pub const REVIEWING_STREAK: u32 = 3;

/// Streak at which a record is promoted to `mastered`.
pub const MASTERED_STREAK: u32 = 5;

/// Result of one applied answer: the stored record plus the status it held
/// before, so callers can detect promotions without a second read.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub record: MasteryRecord,
    pub previous_status: Option<MasteryStatus>,
}

impl TransitionOutcome {
    /// True when this answer moved the record into `mastered`.
    pub fn newly_mastered(&self) -> bool {
        self.record.status == MasteryStatus::Mastered
            && self.previous_status != Some(MasteryStatus::Mastered)
    }
}

/// Computes the successor record for one answer. Pure; callers own the
/// read and the conditional write.
///
/// Counts only ever grow, and the transition is deliberately not
/// idempotent: a duplicate submit double-counts unless the caller dedups.
pub fn transition(
    existing: Option<&MasteryRecord>,
    learner_id: &str,
    item_id: &str,
    was_correct: bool,
    now: DateTime<Utc>,
) -> MasteryRecord {
    let Some(record) = existing else {
        return MasteryRecord {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            item_id: item_id.to_string(),
            status: if was_correct {
                MasteryStatus::Learning
            } else {
                MasteryStatus::New
            },
            correct_count: if was_correct { 1 } else { 0 },
            incorrect_count: if was_correct { 0 } else { 1 },
            streak: if was_correct { 1 } else { 0 },
            next_due: scheduler::initial_due(was_correct, now),
            last_reviewed: now,
            version: 0,
        };
    };

    let new_streak = if was_correct { record.streak + 1 } else { 0 };

    // Promotion cascade, then demotion: a miss always lands on `learning`
    // unless the record never left `new`.
    let mut status = record.status;
    if new_streak >= REVIEWING_STREAK {
        status = MasteryStatus::Reviewing;
    }
    if new_streak >= MASTERED_STREAK {
        status = MasteryStatus::Mastered;
    }
    if !was_correct && status != MasteryStatus::New {
        status = MasteryStatus::Learning;
    }

    MasteryRecord {
        id: record.id.clone(),
        learner_id: record.learner_id.clone(),
        item_id: record.item_id.clone(),
        status,
        correct_count: if was_correct {
            record.correct_count + 1
        } else {
            record.correct_count
        },
        incorrect_count: if was_correct {
            record.incorrect_count
        } else {
            record.incorrect_count + 1
        },
        streak: new_streak,
        next_due: scheduler::next_due_after(was_correct, new_streak, now),
        last_reviewed: now,
        version: record.version,
    }
}

/// Applies transitions through a repository and publishes the resulting
/// events.
pub struct MasteryStore<R> {
    repo: R,
    events: TransitionEvents,
}

impl<R: MasteryRepository> MasteryStore<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            events: TransitionEvents::new(),
        }
    }

    /// Shares an externally owned event channel, e.g. one the badge
    /// collaborator already subscribed to.
    pub fn with_events(repo: R, events: TransitionEvents) -> Self {
        Self { repo, events }
    }

    pub fn events(&self) -> &TransitionEvents {
        &self.events
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Read-modify-write for one answer. The transition is computed in
    /// memory and written through the repository's conditional update, so a
    /// concurrent answer to the same item surfaces as `Conflict` instead of
    /// a lost increment.
    pub async fn record_answer(
        &self,
        learner_id: &str,
        item_id: &str,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let existing = self.repo.get_mastery_record(learner_id, item_id).await?;
        let previous_status = existing.as_ref().map(|record| record.status);

        let updated = transition(existing.as_ref(), learner_id, item_id, was_correct, now);
        let stored = self.repo.upsert_mastery_record(&updated).await?;

        debug!(
            learner_id,
            item_id,
            was_correct,
            streak = stored.streak,
            status = stored.status.as_str(),
            "mastery transition applied"
        );

        self.events.publish(TransitionEvent {
            learner_id: learner_id.to_string(),
            item_id: item_id.to_string(),
            was_correct,
            new_status: stored.status,
            at: now,
        });

        Ok(TransitionOutcome {
            record: stored,
            previous_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::repository::MemoryRepository;

    fn answer(record: Option<&MasteryRecord>, correct: bool, now: DateTime<Utc>) -> MasteryRecord {
        transition(record, "s1", "i1", correct, now)
    }

    #[test]
    fn test_first_correct_answer_creates_learning_record() {
        let now = Utc::now();
        let record = answer(None, true, now);
        assert_eq!(record.status, MasteryStatus::Learning);
        assert_eq!(record.correct_count, 1);
        assert_eq!(record.incorrect_count, 0);
        assert_eq!(record.streak, 1);
        assert_eq!(record.next_due, now + Duration::days(1));
        assert_eq!(record.last_reviewed, now);
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_first_incorrect_answer_creates_new_record() {
        let now = Utc::now();
        let record = answer(None, false, now);
        assert_eq!(record.status, MasteryStatus::New);
        assert_eq!(record.correct_count, 0);
        assert_eq!(record.incorrect_count, 1);
        assert_eq!(record.streak, 0);
        assert_eq!(record.next_due, now + Duration::hours(4));
    }

    #[test]
    fn test_promotion_path_to_mastered() {
        let now = Utc::now();
        let mut record = answer(None, true, now);

        let expected = [
            (2, MasteryStatus::Learning),
            (3, MasteryStatus::Reviewing),
            (4, MasteryStatus::Reviewing),
            (5, MasteryStatus::Mastered),
        ];
        for (streak, status) in expected {
            record = answer(Some(&record), true, now);
            assert_eq!(record.streak, streak);
            assert_eq!(record.status, status);
        }
        assert_eq!(record.correct_count, 5);
        assert_eq!(record.incorrect_count, 0);
        assert_eq!(record.next_due, now + Duration::days(30));
    }

    #[test]
    fn test_streak_three_schedules_fourteen_days() {
        let now = Utc::now();
        let mut record = answer(None, true, now);
        record = answer(Some(&record), true, now);
        record = answer(Some(&record), true, now);
        assert_eq!(record.streak, 3);
        assert_eq!(record.status, MasteryStatus::Reviewing);
        assert_eq!(record.next_due, now + Duration::days(14));
    }

    #[test]
    fn test_miss_demotes_mastered_to_learning() {
        let now = Utc::now();
        let mut record = answer(None, true, now);
        for _ in 0..5 {
            record = answer(Some(&record), true, now);
        }
        assert_eq!(record.status, MasteryStatus::Mastered);

        let demoted = answer(Some(&record), false, now);
        assert_eq!(demoted.status, MasteryStatus::Learning);
        assert_eq!(demoted.streak, 0);
        assert_eq!(demoted.next_due, now + Duration::hours(4));
        assert_eq!(demoted.incorrect_count, record.incorrect_count + 1);
        assert_eq!(demoted.correct_count, record.correct_count);
    }

    #[test]
    fn test_miss_on_new_record_stays_new() {
        let now = Utc::now();
        let record = answer(None, false, now);
        assert_eq!(record.status, MasteryStatus::New);

        let again = answer(Some(&record), false, now);
        assert_eq!(again.status, MasteryStatus::New);
        assert_eq!(again.incorrect_count, 2);
    }

    #[test]
    fn test_transition_is_not_idempotent() {
        let now = Utc::now();
        let base = answer(None, true, now);
        let once = answer(Some(&base), true, now);
        let twice = answer(Some(&once), true, now);
        assert_ne!(once.correct_count, twice.correct_count);
        assert_ne!(once.streak, twice.streak);
    }

    #[tokio::test]
    async fn test_record_answer_persists_and_emits() {
        let store = MasteryStore::new(MemoryRepository::new());
        let mut receiver = store.events().subscribe();
        let now = Utc::now();

        let outcome = store.record_answer("s1", "i1", true, now).await.unwrap();
        assert_eq!(outcome.previous_status, None);
        assert_eq!(outcome.record.status, MasteryStatus::Learning);
        assert_eq!(outcome.record.version, 1);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.item_id, "i1");
        assert!(event.was_correct);
        assert_eq!(event.new_status, MasteryStatus::Learning);
    }

    #[tokio::test]
    async fn test_newly_mastered_flag() {
        let store = MasteryStore::new(MemoryRepository::new());
        let now = Utc::now();

        let mut outcome = store.record_answer("s1", "i1", true, now).await.unwrap();
        for _ in 0..4 {
            outcome = store.record_answer("s1", "i1", true, now).await.unwrap();
        }
        assert!(outcome.newly_mastered());

        // A sixth correct answer keeps the status; nothing new to report.
        let outcome = store.record_answer("s1", "i1", true, now).await.unwrap();
        assert_eq!(outcome.record.status, MasteryStatus::Mastered);
        assert!(!outcome.newly_mastered());
    }

    #[tokio::test]
    async fn test_duplicate_submit_double_counts() {
        let store = MasteryStore::new(MemoryRepository::new());
        let now = Utc::now();

        store.record_answer("s1", "i1", true, now).await.unwrap();
        let outcome = store.record_answer("s1", "i1", true, now).await.unwrap();
        assert_eq!(outcome.record.correct_count, 2);
        assert_eq!(outcome.record.streak, 2);
    }
}
