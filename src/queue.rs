//! Review queue assembly: which records are due, and how each becomes a
//! multiple-choice exercise.
//!
//! Distractors prefer items sharing a tag with the target; the pool is
//! topped up from the remaining items when tag neighbours run short. Sparse
//! pools degrade down to a single-option exercise rather than failing.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::{Direction, MasteryRecord, ReviewExercise, VocabularyItem};
use crate::repository::{MasteryRepository, RepositoryError};

/// Distractors per exercise when the pool allows.
pub const DISTRACTOR_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Due records for the learner, earliest `next_due` first. The sort is
/// stable, so equal due times keep the repository's deterministic order.
pub async fn build_queue<R: MasteryRepository>(
    repo: &R,
    learner_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<MasteryRecord>, RepositoryError> {
    let mut due = repo.list_due_records(learner_id, now).await?;
    due.sort_by_key(|record| record.next_due);
    debug!(learner_id, due_count = due.len(), "review queue built");
    Ok(due)
}

/// Builds the exercise for one due record against the learner's item pool.
///
/// The option set always contains the target exactly once and never holds
/// duplicates; with fewer than two items in the pool the target is the sole
/// option, which the caller renders as a trivially-correct exercise.
pub fn build_exercise<G: Rng>(
    record: &MasteryRecord,
    all_items: &[VocabularyItem],
    rng: &mut G,
) -> Result<ReviewExercise, QueueError> {
    let target = all_items
        .iter()
        .find(|item| item.id == record.item_id)
        .ok_or_else(|| QueueError::ItemNotFound(record.item_id.clone()))?;

    let direction = if rng.random_bool(0.5) {
        Direction::ToEn
    } else {
        Direction::ToPt
    };

    // Tag neighbours first.
    let mut distractors: Vec<&VocabularyItem> = all_items
        .iter()
        .filter(|item| {
            item.id != target.id && item.tags.iter().any(|tag| target.tags.contains(tag))
        })
        .collect();
    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);

    // Top up from the rest of the pool, without replacement.
    if distractors.len() < DISTRACTOR_COUNT {
        let mut remaining: Vec<&VocabularyItem> = all_items
            .iter()
            .filter(|item| {
                item.id != target.id && !distractors.iter().any(|chosen| chosen.id == item.id)
            })
            .collect();
        remaining.shuffle(rng);
        for item in remaining {
            if distractors.len() >= DISTRACTOR_COUNT {
                break;
            }
            distractors.push(item);
        }
    }

    let mut options: Vec<VocabularyItem> = distractors.into_iter().cloned().collect();
    options.push(target.clone());
    options.shuffle(rng);

    Ok(ReviewExercise {
        direction,
        item: target.clone(),
        options,
    })
}

/// Convenience for a full review run: queue plus one exercise per entry.
pub async fn build_review_exercises<R: MasteryRepository, G: Rng>(
    repo: &R,
    learner_id: &str,
    now: DateTime<Utc>,
    rng: &mut G,
) -> Result<Vec<ReviewExercise>, QueueError> {
    let queue = build_queue(repo, learner_id, now).await?;
    let items = repo.list_items(None).await?;
    queue
        .iter()
        .map(|record| build_exercise(record, &items, rng))
        .collect()
}
