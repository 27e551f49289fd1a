//! Interval policy: maps a consecutive-correct streak to the next review
//! offset.
//!
//! The table is fixed and saturating — streaks at or past the table length
//! reuse the longest interval, so spacing grows with mastery but never
//! unbounded. Incorrect answers ignore the table entirely and schedule a
//! short fixed re-exposure.

use chrono::{DateTime, Duration, Utc};

/// Review intervals in days, indexed by saturated streak.
pub const REVIEW_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

/// Re-exposure delay after an incorrect answer, regardless of prior streak.
pub const RETRY_DELAY_HOURS: i64 = 4;

/// Days until the next review for a given streak. Pure, total, saturating.
pub fn interval_days(streak: u32) -> i64 {
    let index = (streak as usize).min(REVIEW_INTERVALS.len() - 1);
    REVIEW_INTERVALS[index]
}

/// Next due timestamp after an answer on an existing record.
pub fn next_due_after(was_correct: bool, new_streak: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    if was_correct {
        now + Duration::days(interval_days(new_streak))
    } else {
        now + Duration::hours(RETRY_DELAY_HOURS)
    }
}

/// Due timestamp for a record created by its first answer: the shortest
/// table interval on a correct answer, the retry delay otherwise.
pub fn initial_due(was_correct: bool, now: DateTime<Utc>) -> DateTime<Utc> {
    if was_correct {
        now + Duration::days(REVIEW_INTERVALS[0])
    } else {
        now + Duration::hours(RETRY_DELAY_HOURS)
    }
}
