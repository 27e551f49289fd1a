//! Experience points and badge-eligible signals for completed sessions.

use crate::config::RewardConfig;
use crate::models::BadgeEvent;

/// XP for a session: base plus a flat accuracy bonus. Deterministic.
pub fn compute_xp(config: &RewardConfig, base_xp: u32, accuracy: u8) -> u32 {
    let bonus = if accuracy >= config.high_accuracy_threshold {
        config.high_accuracy_bonus
    } else if accuracy >= config.mid_accuracy_threshold {
        config.mid_accuracy_bonus
    } else {
        0
    };
    base_xp + bonus
}

/// Signals the badge rules engine may act on. The engine evaluates; the
/// core only reports what happened.
pub fn badge_events(accuracy: u8, xp_earned: u32, mastered_item_ids: &[String]) -> Vec<BadgeEvent> {
    let mut events = vec![
        BadgeEvent::SessionCompleted { accuracy },
        BadgeEvent::XpEarned { amount: xp_earned },
    ];
    if accuracy == 100 {
        events.push(BadgeEvent::PerfectSession);
    }
    for item_id in mastered_item_ids {
        events.push(BadgeEvent::ItemMastered {
            item_id: item_id.clone(),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_bonus_tiers() {
        let config = RewardConfig::default();
        assert_eq!(compute_xp(&config, 10, 95), 15);
        assert_eq!(compute_xp(&config, 10, 90), 15);
        assert_eq!(compute_xp(&config, 10, 89), 12);
        assert_eq!(compute_xp(&config, 10, 75), 12);
        assert_eq!(compute_xp(&config, 10, 70), 12);
        assert_eq!(compute_xp(&config, 10, 69), 10);
        assert_eq!(compute_xp(&config, 10, 50), 10);
        assert_eq!(compute_xp(&config, 10, 0), 10);
    }

    #[test]
    fn test_badge_events_for_perfect_session() {
        let mastered = vec!["i1".to_string()];
        let events = badge_events(100, 15, &mastered);
        assert!(events.contains(&BadgeEvent::SessionCompleted { accuracy: 100 }));
        assert!(events.contains(&BadgeEvent::XpEarned { amount: 15 }));
        assert!(events.contains(&BadgeEvent::PerfectSession));
        assert!(events.contains(&BadgeEvent::ItemMastered {
            item_id: "i1".to_string()
        }));
    }

    #[test]
    fn test_no_perfect_event_below_full_accuracy() {
        let events = badge_events(99, 15, &[]);
        assert!(!events.contains(&BadgeEvent::PerfectSession));
        assert_eq!(events.len(), 2);
    }
}
