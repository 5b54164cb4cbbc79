//! Visit counting and reward threshold evaluation
//!
//! A stored threshold below 1 is a misconfiguration; it is evaluated as 1 so
//! that every visit is reward-eligible and redemption never subtracts a
//! negative amount.

use serde::Serialize;
use utoipa::ToSchema;

/// Threshold actually used for evaluation
pub fn effective_threshold(threshold: i32) -> i32 {
    threshold.max(1)
}

/// True once the visitor has enough visits for a reward
pub fn threshold_crossed(visit_count: i32, threshold: i32) -> bool {
    visit_count >= effective_threshold(threshold)
}

/// Visits still needed before a reward unlocks
pub fn visits_remaining(visit_count: i32, threshold: i32) -> i32 {
    (effective_threshold(threshold) - visit_count).max(0)
}

/// Visit count left after an approved redemption. Overflow visits are kept.
pub fn visits_after_redemption(visit_count: i32, threshold: i32) -> i32 {
    (visit_count - effective_threshold(threshold)).max(0)
}

/// Reward progress shown on the welcome-back screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RewardProgress {
    pub visit_count: i32,
    pub threshold: i32,
    pub remaining: i32,
    pub unlocked: bool,
}

impl RewardProgress {
    pub fn new(visit_count: i32, threshold: i32) -> Self {
        Self {
            visit_count,
            threshold: effective_threshold(threshold),
            remaining: visits_remaining(visit_count, threshold),
            unlocked: threshold_crossed(visit_count, threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert!(!threshold_crossed(4, 5));
        assert!(threshold_crossed(5, 5));
        assert!(threshold_crossed(9, 5));
    }

    #[test]
    fn test_misconfigured_threshold_is_always_eligible() {
        assert!(threshold_crossed(1, 0));
        assert!(threshold_crossed(1, -3));
        assert_eq!(visits_after_redemption(1, 0), 0);
        assert_eq!(visits_after_redemption(3, -2), 2);
    }

    #[test]
    fn test_redemption_keeps_overflow() {
        assert_eq!(visits_after_redemption(5, 5), 0);
        assert_eq!(visits_after_redemption(7, 5), 2);
    }

    #[test]
    fn test_redemption_never_negative() {
        assert_eq!(visits_after_redemption(2, 5), 0);
    }

    #[test]
    fn test_progress() {
        let progress = RewardProgress::new(3, 5);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.unlocked);

        let progress = RewardProgress::new(6, 5);
        assert_eq!(progress.remaining, 0);
        assert!(progress.unlocked);
    }
}
