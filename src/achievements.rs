//! Static achievement catalog.
//!
//! Every unlockable achievement is declared here as data: fixed entries for
//! the training, analyzer, verifier, and general categories, plus synthetic
//! per-level achievements generated on demand when a user levels up.

use serde::{Deserialize, Serialize};

/// Activity category an achievement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Training,
    Analyzer,
    Verifier,
    General,
}

impl std::fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AchievementCategory::Training => write!(f, "training"),
            AchievementCategory::Analyzer => write!(f, "analyzer"),
            AchievementCategory::Verifier => write!(f, "verifier"),
            AchievementCategory::General => write!(f, "general"),
        }
    }
}

/// Achievement rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rarity::Common => write!(f, "common"),
            Rarity::Rare => write!(f, "rare"),
            Rarity::Epic => write!(f, "epic"),
            Rarity::Legendary => write!(f, "legendary"),
        }
    }
}

/// A catalog entry: everything about an achievement except when it was
/// unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub points: u32,
    pub icon: String,
    pub rarity: Rarity,
}

/// Static catalog entry backed by string literals.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub points: u32,
    pub icon: &'static str,
    pub rarity: Rarity,
}

impl From<&AchievementDef> for AchievementSpec {
    fn from(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            category: def.category,
            points: def.points,
            icon: def.icon.to_string(),
            rarity: def.rarity,
        }
    }
}

/// All fixed achievement definitions.
pub const CATALOG: &[AchievementDef] = &[
    // Training
    AchievementDef {
        id: "first-module",
        name: "Getting Started",
        description: "Complete your first training module",
        category: AchievementCategory::Training,
        points: 50,
        icon: "play",
        rarity: Rarity::Common,
    },
    AchievementDef {
        id: "perfect-score",
        name: "Perfectionist",
        description: "Score 100% on any training module",
        category: AchievementCategory::Training,
        points: 100,
        icon: "star",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "speed-demon",
        name: "Speed Demon",
        description: "Complete a module in under 10 minutes",
        category: AchievementCategory::Training,
        points: 75,
        icon: "zap",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "flawless-victory",
        name: "Flawless Victory",
        description: "Complete a module without any mistakes",
        category: AchievementCategory::Training,
        points: 100,
        icon: "trophy",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "training-master",
        name: "Training Master",
        description: "Complete all beginner training modules",
        category: AchievementCategory::Training,
        points: 200,
        icon: "medal",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "advanced-scholar",
        name: "Advanced Scholar",
        description: "Complete all advanced training modules",
        category: AchievementCategory::Training,
        points: 500,
        icon: "crown",
        rarity: Rarity::Legendary,
    },
    // Analyzer
    AchievementDef {
        id: "first-analysis",
        name: "First Analysis",
        description: "Complete your first content analysis",
        category: AchievementCategory::Analyzer,
        points: 25,
        icon: "eye",
        rarity: Rarity::Common,
    },
    AchievementDef {
        id: "keen-eye",
        name: "Keen Eye",
        description: "Analyze 10 pieces of content",
        category: AchievementCategory::Analyzer,
        points: 100,
        icon: "target",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "truth-seeker",
        name: "Truth Seeker",
        description: "Analyze 50 pieces of content",
        category: AchievementCategory::Analyzer,
        points: 250,
        icon: "brain",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "analysis-expert",
        name: "Analysis Expert",
        description: "Analyze 100 pieces of content",
        category: AchievementCategory::Analyzer,
        points: 500,
        icon: "gem",
        rarity: Rarity::Legendary,
    },
    // Verifier
    AchievementDef {
        id: "first-verification",
        name: "First Verification",
        description: "Complete your first fact verification",
        category: AchievementCategory::Verifier,
        points: 25,
        icon: "shield",
        rarity: Rarity::Common,
    },
    AchievementDef {
        id: "fact-checker",
        name: "Fact Checker",
        description: "Verify 10 claims or statements",
        category: AchievementCategory::Verifier,
        points: 100,
        icon: "check-circle",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "truth-guardian",
        name: "Truth Guardian",
        description: "Verify 50 claims or statements",
        category: AchievementCategory::Verifier,
        points: 250,
        icon: "shield",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "verification-master",
        name: "Verification Master",
        description: "Verify 100 claims or statements",
        category: AchievementCategory::Verifier,
        points: 500,
        icon: "crown",
        rarity: Rarity::Legendary,
    },
    // General
    AchievementDef {
        id: "level-up-5",
        name: "Rising Star",
        description: "Reach level 5",
        category: AchievementCategory::General,
        points: 100,
        icon: "trending-up",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "level-up-10",
        name: "Expert Fighter",
        description: "Reach level 10",
        category: AchievementCategory::General,
        points: 250,
        icon: "medal",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "level-up-20",
        name: "Misinformation Slayer",
        description: "Reach level 20",
        category: AchievementCategory::General,
        points: 500,
        icon: "crown",
        rarity: Rarity::Legendary,
    },
    AchievementDef {
        id: "points-milestone-1000",
        name: "Point Collector",
        description: "Earn 1,000 total points",
        category: AchievementCategory::General,
        points: 100,
        icon: "award",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "points-milestone-5000",
        name: "Point Master",
        description: "Earn 5,000 total points",
        category: AchievementCategory::General,
        points: 250,
        icon: "gem",
        rarity: Rarity::Epic,
    },
    AchievementDef {
        id: "streak-week",
        name: "Consistent Learner",
        description: "Maintain a 7-day learning streak",
        category: AchievementCategory::General,
        points: 150,
        icon: "calendar",
        rarity: Rarity::Rare,
    },
    AchievementDef {
        id: "community-contributor",
        name: "Community Contributor",
        description: "Share achievements and progress",
        category: AchievementCategory::General,
        points: 75,
        icon: "users",
        rarity: Rarity::Common,
    },
];

/// Look up a fixed catalog entry by id.
pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Synthetic achievement awarded when a user reaches `level`.
///
/// Worth `level * 50` points; rarity escalates at levels 10, 25, and 50.
pub fn level_achievement(level: u32) -> AchievementSpec {
    let rarity = if level >= 50 {
        Rarity::Legendary
    } else if level >= 25 {
        Rarity::Epic
    } else if level >= 10 {
        Rarity::Rare
    } else {
        Rarity::Common
    };

    AchievementSpec {
        id: format!("level-{level}"),
        name: format!("Level {level} Master"),
        description: format!("Reached level {level}!"),
        category: AchievementCategory::General,
        points: level * 50,
        icon: "trophy".to_string(),
        rarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut seen = HashSet::new();
        for def in CATALOG {
            assert!(seen.insert(def.id), "duplicate achievement id: {}", def.id);
        }
    }

    #[test]
    fn test_find_known_and_unknown_ids() {
        assert_eq!(find("first-module").map(|d| d.points), Some(50));
        assert!(find("no-such-achievement").is_none());
    }

    #[test]
    fn test_level_achievement_points_and_rarity() {
        assert_eq!(level_achievement(2).points, 100);
        assert_eq!(level_achievement(2).rarity, Rarity::Common);
        assert_eq!(level_achievement(10).rarity, Rarity::Rare);
        assert_eq!(level_achievement(25).rarity, Rarity::Epic);
        assert_eq!(level_achievement(50).rarity, Rarity::Legendary);
        assert_eq!(level_achievement(50).id, "level-50");
    }
}
