use serde::{Deserialize, Serialize};

/// Tunables for session rewards. Defaults match the shipped product rules;
/// embedding applications may override per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    /// Base XP for review-only sessions (lessons supply their own base).
    pub review_base_xp: u32,
    /// Accuracy percentage at or above which the high bonus applies.
    pub high_accuracy_threshold: u8,
    pub high_accuracy_bonus: u32,
    /// Accuracy percentage at or above which the mid bonus applies.
    pub mid_accuracy_threshold: u8,
    pub mid_accuracy_bonus: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            review_base_xp: 10,
            high_accuracy_threshold: 90,
            high_accuracy_bonus: 5,
            mid_accuracy_threshold: 70,
            mid_accuracy_bonus: 2,
        }
    }
}
