//! Property-based tests for the level curve.

use proptest::prelude::*;

use veritas_core::leveling::{calculate_level, level_requirement};

proptest! {
    /// Points inside a level plus points remaining always equal that
    /// level's full requirement.
    #[test]
    fn progress_partitions_the_level_requirement(total_points in 0u32..=u32::MAX) {
        let progress = calculate_level(total_points);
        prop_assert_eq!(
            u64::from(progress.current_level_points)
                + u64::from(progress.points_to_next_level),
            level_requirement(progress.level)
        );
    }

    /// More points never mean a lower level.
    #[test]
    fn level_is_monotonic_in_points(total_points in 0u32..u32::MAX, extra in 1u32..10_000) {
        let before = calculate_level(total_points);
        let after = calculate_level(total_points.saturating_add(extra));
        prop_assert!(after.level >= before.level);
    }

    /// The level is always at least 1, and points inside the level never
    /// reach the requirement (that would mean the next level).
    #[test]
    fn current_level_points_stay_below_requirement(total_points in 0u32..=u32::MAX) {
        let progress = calculate_level(total_points);
        prop_assert!(progress.level >= 1);
        prop_assert!(
            u64::from(progress.current_level_points) < level_requirement(progress.level)
        );
        prop_assert!(progress.points_to_next_level >= 1);
    }

    /// The requirement curve grows strictly with the level.
    #[test]
    fn requirement_grows_with_level(level in 1u32..5_000) {
        prop_assert!(level_requirement(level + 1) > level_requirement(level));
    }

    /// Reconstructing the cumulative threshold from per-level requirements
    /// matches what calculate_level consumed.
    #[test]
    fn consumed_points_match_cumulative_requirements(total_points in 0u32..1_000_000) {
        let progress = calculate_level(total_points);
        let consumed: u64 = (1..progress.level).map(level_requirement).sum();
        prop_assert_eq!(
            consumed + u64::from(progress.current_level_points),
            u64::from(total_points)
        );
    }
}
