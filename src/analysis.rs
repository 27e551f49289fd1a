//! Per-tag skill summary derived from mastery counts. Read-only; dashboards
//! consume the result.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{MasteryRecord, VocabularyItem};

const MIN_ATTEMPTS: u32 = 3;
const STRENGTH_ACCURACY: u8 = 80;
const NEEDS_WORK_ACCURACY: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    Strength,
    NeedsWork,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAnalysis {
    pub tag: String,
    pub accuracy: u8,
    pub total_attempts: u32,
    pub status: SkillStatus,
}

/// Aggregates answer counts per tag across a learner's mastery records.
/// Tags with fewer than three attempts are omitted; the rest are ranked
/// strongest first.
pub fn analyze_tags(records: &[MasteryRecord], items: &[VocabularyItem]) -> Vec<SkillAnalysis> {
    let tags_by_item: HashMap<&str, &[String]> = items
        .iter()
        .map(|item| (item.id.as_str(), item.tags.as_slice()))
        .collect();

    let mut by_tag: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in records {
        let total = record.total_answers();
        if total == 0 {
            continue;
        }
        let Some(tags) = tags_by_item.get(record.item_id.as_str()) else {
            continue;
        };
        for tag in tags.iter() {
            let entry = by_tag.entry(tag.as_str()).or_insert((0, 0));
            entry.0 += record.correct_count;
            entry.1 += total;
        }
    }

    let mut analysis: Vec<SkillAnalysis> = by_tag
        .into_iter()
        .filter(|(_, (_, total))| *total >= MIN_ATTEMPTS)
        .map(|(tag, (correct, total))| {
            let accuracy = ((correct as f64 / total as f64) * 100.0).round() as u8;
            let status = if accuracy >= STRENGTH_ACCURACY {
                SkillStatus::Strength
            } else if accuracy < NEEDS_WORK_ACCURACY {
                SkillStatus::NeedsWork
            } else {
                SkillStatus::Neutral
            };
            SkillAnalysis {
                tag: tag.to_string(),
                accuracy,
                total_attempts: total,
                status,
            }
        })
        .collect();

    analysis.sort_by(|a, b| b.accuracy.cmp(&a.accuracy).then_with(|| a.tag.cmp(&b.tag)));
    analysis
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::MasteryStatus;

    fn item(id: &str, tags: &[&str]) -> VocabularyItem {
        VocabularyItem {
            id: id.to_string(),
            text_en: id.to_string(),
            text_pt: id.to_string(),
            image_url: None,
            audio_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            level: None,
        }
    }

    fn record(item_id: &str, correct: u32, incorrect: u32) -> MasteryRecord {
        let now = Utc::now();
        MasteryRecord {
            id: format!("r-{item_id}"),
            learner_id: "s1".to_string(),
            item_id: item_id.to_string(),
            status: MasteryStatus::Learning,
            correct_count: correct,
            incorrect_count: incorrect,
            streak: 0,
            next_due: now,
            last_reviewed: now,
            version: 1,
        }
    }

    #[test]
    fn test_classifies_strengths_and_weaknesses() {
        let items = vec![
            item("i1", &["animals"]),
            item("i2", &["animals"]),
            item("i3", &["food"]),
        ];
        let records = vec![
            record("i1", 4, 0),
            record("i2", 4, 1),
            record("i3", 1, 4),
        ];

        let analysis = analyze_tags(&records, &items);
        assert_eq!(analysis.len(), 2);

        assert_eq!(analysis[0].tag, "animals");
        assert_eq!(analysis[0].accuracy, 89);
        assert_eq!(analysis[0].status, SkillStatus::Strength);
        assert_eq!(analysis[0].total_attempts, 9);

        assert_eq!(analysis[1].tag, "food");
        assert_eq!(analysis[1].accuracy, 20);
        assert_eq!(analysis[1].status, SkillStatus::NeedsWork);
    }

    #[test]
    fn test_requires_minimum_attempts() {
        let items = vec![item("i1", &["rare"])];
        let records = vec![record("i1", 2, 0)];
        assert!(analyze_tags(&records, &items).is_empty());
    }

    #[test]
    fn test_neutral_band() {
        let items = vec![item("i1", &["mid"])];
        let records = vec![record("i1", 7, 3)];
        let analysis = analyze_tags(&records, &items);
        assert_eq!(analysis[0].accuracy, 70);
        assert_eq!(analysis[0].status, SkillStatus::Neutral);
    }
}
