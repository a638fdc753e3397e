//! Level curve: deterministic mapping from cumulative points to levels.
//!
//! Levels follow an exponential curve where advancing from level `n` to
//! level `n + 1` costs `floor(n^1.5 * 100)` points. The curve is always
//! recomputed from the full point total so stored level data can never
//! drift from the totals that produced it.

use serde::{Deserialize, Serialize};

/// Progression through the level curve for a given point total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level, starting at 1.
    pub level: u32,
    /// Points accumulated since entering the current level.
    pub current_level_points: u32,
    /// Points still needed to reach the next level.
    pub points_to_next_level: u32,
}

/// Points required to advance from `level` to `level + 1`.
///
/// `requirement(n) = floor(n^1.5 * 100)`, so the cost per level grows
/// strictly, which guarantees [`calculate_level`] terminates.
pub fn level_requirement(level: u32) -> u64 {
    (f64::from(level).powf(1.5) * 100.0).floor() as u64
}

/// Compute level progression for a cumulative point total.
///
/// Walks the curve from level 1, consuming each level's requirement until
/// the remaining points no longer cover the next step. For every total,
/// `current_level_points + points_to_next_level == requirement(level)`.
pub fn calculate_level(total_points: u32) -> LevelProgress {
    let total = u64::from(total_points);
    let mut level: u32 = 1;
    let mut consumed: u64 = 0;

    loop {
        let requirement = level_requirement(level);
        if consumed + requirement > total {
            break;
        }
        consumed += requirement;
        level += 1;
    }

    let current_level_points = total - consumed;
    let points_to_next_level = level_requirement(level) - current_level_points;

    LevelProgress {
        level,
        current_level_points: current_level_points as u32,
        points_to_next_level: points_to_next_level as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_for_first_levels() {
        assert_eq!(level_requirement(1), 100);
        assert_eq!(level_requirement(2), 282);
        assert_eq!(level_requirement(3), 519);
        assert_eq!(level_requirement(4), 800);
    }

    #[test]
    fn test_zero_points_is_level_one() {
        let progress = calculate_level(0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.current_level_points, 0);
        assert_eq!(progress.points_to_next_level, 100);
    }

    #[test]
    fn test_exact_threshold_advances_level() {
        let progress = calculate_level(100);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.current_level_points, 0);
        assert_eq!(progress.points_to_next_level, 282);
    }

    #[test]
    fn test_partial_progress_within_level() {
        let progress = calculate_level(50);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.current_level_points, 50);
        assert_eq!(progress.points_to_next_level, 50);
    }

    #[test]
    fn test_progress_spanning_multiple_levels() {
        // 100 (level 1) + 282 (level 2) = 382 consumed entering level 3
        let progress = calculate_level(400);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.current_level_points, 18);
        assert_eq!(progress.points_to_next_level, 519 - 18);
    }

    #[test]
    fn test_invariant_holds_across_totals() {
        for total in (0..50_000).step_by(37) {
            let progress = calculate_level(total);
            assert_eq!(
                u64::from(progress.current_level_points) + u64::from(progress.points_to_next_level),
                level_requirement(progress.level),
                "invariant broken at {total} points"
            );
        }
    }

    #[test]
    fn test_level_is_monotonic() {
        let mut previous = calculate_level(0).level;
        for total in 1..10_000 {
            let level = calculate_level(total).level;
            assert!(level >= previous, "level regressed at {total} points");
            previous = level;
        }
    }
}
