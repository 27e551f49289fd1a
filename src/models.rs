use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Retention state of one (learner, item) pair.
///
/// The status is a deterministic function of the streak and the most recent
/// answer's correctness; see `store::transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryStatus {
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl MasteryStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "learning" => Self::Learning,
            "reviewing" => Self::Reviewing,
            "mastered" => Self::Mastered,
            _ => Self::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Reviewing => "reviewing",
            Self::Mastered => "mastered",
        }
    }
}

/// CEFR proficiency tier carried by content items. Content selection happens
/// outside the core; the tier only participates in item filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CefrLevel {
    A0,
    A1,
    A2,
    B1,
    B2,
}

/// Immutable content unit. Created by content authoring; referenced by id,
/// never owned, by mastery records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub text_en: String,
    pub text_pt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<CefrLevel>,
}

/// Per-(learner, item) retention record. Mutated exactly once per answer
/// event, never deleted.
///
/// `version` backs the conditional write in the repository: a transition is
/// computed against the version it read, and the write fails on mismatch
/// instead of losing an increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub id: String,
    pub learner_id: String,
    pub item_id: String,
    pub status: MasteryStatus,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub streak: u32,
    pub next_due: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    pub version: i64,
}

impl MasteryRecord {
    /// Due iff `next_due` is at or before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due <= now
    }

    pub fn total_answers(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }
}

/// Translation direction of a review exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "translate_to_en")]
    ToEn,
    #[serde(rename = "translate_to_pt")]
    ToPt,
}

impl Direction {
    /// Text shown to the learner as the prompt.
    pub fn prompt_text<'a>(&self, item: &'a VocabularyItem) -> &'a str {
        match self {
            Direction::ToEn => &item.text_pt,
            Direction::ToPt => &item.text_en,
        }
    }

    /// Text an option displays as a candidate answer.
    pub fn answer_text<'a>(&self, item: &'a VocabularyItem) -> &'a str {
        match self {
            Direction::ToEn => &item.text_en,
            Direction::ToPt => &item.text_pt,
        }
    }
}

/// Ephemeral multiple-choice exercise built per queue entry and discarded
/// after the learner answers. The target item appears exactly once among the
/// options; a sparse pool can shrink the option set down to the target alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewExercise {
    pub direction: Direction,
    pub item: VocabularyItem,
    pub options: Vec<VocabularyItem>,
}

impl ReviewExercise {
    pub fn is_correct_option(&self, option_id: &str) -> bool {
        self.item.id == option_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    WordToImage,
    WordToTranslation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPair {
    pub item_id: String,
    pub match_type: MatchType,
}

/// Lesson exercise payloads. Authoring produces these; the session runner
/// only needs to know which item, if any, an exercise tracks for mastery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseKind {
    ListenTapImage {
        audio_text: String,
        correct_item_id: String,
        distractor_item_ids: Vec<String>,
    },
    Match {
        pairs: Vec<MatchPair>,
    },
    OrderWords {
        sentence_en: String,
        sentence_pt: String,
        words: Vec<String>,
        correct_order: Vec<usize>,
    },
    ReadChoose {
        question: String,
        correct_item_id: String,
        distractor_item_ids: Vec<String>,
    },
    SpeakRepeat {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audio_url: Option<String>,
    },
}

impl ExerciseKind {
    /// The item whose mastery record this exercise feeds, if any.
    ///
    /// Multi-pair matching tracks only the first pair's item; ordering and
    /// speaking exercises have no single trackable item.
    pub fn tracked_item_id(&self) -> Option<&str> {
        match self {
            ExerciseKind::ListenTapImage { correct_item_id, .. }
            | ExerciseKind::ReadChoose { correct_item_id, .. } => Some(correct_item_id.as_str()),
            ExerciseKind::Match { pairs } => pairs.first().map(|pair| pair.item_id.as_str()),
            ExerciseKind::OrderWords { .. } | ExerciseKind::SpeakRepeat { .. } => None,
        }
    }
}

/// One unit of work inside a session: either an authored lesson exercise or
/// a generated review exercise.
#[derive(Debug, Clone)]
pub enum SessionExercise {
    Lesson { id: String, kind: ExerciseKind },
    Review(ReviewExercise),
}

impl SessionExercise {
    pub fn tracked_item_id(&self) -> Option<&str> {
        match self {
            SessionExercise::Lesson { kind, .. } => kind.tracked_item_id(),
            SessionExercise::Review(exercise) => Some(exercise.item.id.as_str()),
        }
    }
}

/// Signals a finished session hands to the badge rules engine. The core only
/// emits these; evaluation lives in the gamification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeEvent {
    SessionCompleted { accuracy: u8 },
    XpEarned { amount: u32 },
    PerfectSession,
    ItemMastered { item_id: String },
}

/// Durable output of a completed session, handed to the progress and badge
/// collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub accuracy: u8,
    pub elapsed_seconds: u64,
    pub xp_earned: u32,
    pub correct_count: u32,
    pub total_count: u32,
    pub badge_events: Vec<BadgeEvent>,
}
