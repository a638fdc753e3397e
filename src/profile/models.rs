//! Profile data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::achievements::{AchievementCategory, AchievementSpec, Rarity};
use crate::leveling;
use crate::store::value::timestamp;
use crate::training::models::ModuleProgress;

/// Skill tier derived from completed training modules.
///
/// Ordered: beginner < intermediate < advanced < expert < master. Tier
/// derivation only ever assigns the first three; the top tiers are
/// reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "beginner"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Advanced => write!(f, "advanced"),
            SkillLevel::Expert => write!(f, "expert"),
            SkillLevel::Master => write!(f, "master"),
        }
    }
}

/// Activity category a point award is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointCategory {
    Training,
    Analyzer,
    Verifier,
}

impl PointCategory {
    /// Profile field holding this category's stats object.
    pub fn stats_field(self) -> &'static str {
        match self {
            PointCategory::Training => "trainingStats",
            PointCategory::Analyzer => "analyzerStats",
            PointCategory::Verifier => "verifierStats",
        }
    }
}

impl std::fmt::Display for PointCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointCategory::Training => write!(f, "training"),
            PointCategory::Analyzer => write!(f, "analyzer"),
            PointCategory::Verifier => write!(f, "verifier"),
        }
    }
}

/// Training activity counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingStats {
    pub modules_completed: u32,
    pub total_time_spent: u32,
    pub average_accuracy: f64,
    pub total_scenarios: u32,
    pub perfect_scores: u32,
    pub points_earned: u32,
}

/// Analyzer activity counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerStats {
    pub total_analyses: u32,
    pub misinformation_detected: u32,
    pub accurate_detections: u32,
    pub average_confidence: f64,
    pub points_earned: u32,
}

/// Verifier activity counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifierStats {
    pub total_verifications: u32,
    pub sources_checked: u32,
    pub fact_checks_performed: u32,
    pub accurate_verifications: u32,
    pub points_earned: u32,
}

/// Links to a user's external profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub twitter: String,
    pub linkedin: String,
    pub instagram: String,
    pub github: String,
}

/// Interface theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

/// User notification and visibility preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub email_notifications: bool,
    pub weekly_reports: bool,
    pub sms_alerts: bool,
    pub public_profile: bool,
    pub share_achievements: bool,
    pub language: String,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            weekly_reports: true,
            sms_alerts: false,
            public_profile: true,
            share_achievements: false,
            language: "English".to_string(),
            theme: Theme::Light,
        }
    }
}

/// An unlocked achievement. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub points: u32,
    pub icon: String,
    #[serde(with = "timestamp")]
    pub unlocked_at: DateTime<Utc>,
    pub rarity: Rarity,
}

impl Achievement {
    /// Stamp a catalog entry with its unlock time.
    pub fn from_spec(spec: &AchievementSpec, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            category: spec.category,
            points: spec.points,
            icon: spec.icon.clone(),
            unlocked_at,
            rarity: spec.rarity,
        }
    }
}

/// The authoritative per-user profile record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(
        rename = "photoURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(with = "timestamp")]
    pub joined_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_active: DateTime<Utc>,

    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub preferences: Preferences,

    // Gamification
    pub level: u32,
    pub total_points: u32,
    pub current_level_points: u32,
    pub points_to_next_level: u32,

    // Activity stats
    #[serde(default)]
    pub training_stats: TrainingStats,
    #[serde(default)]
    pub analyzer_stats: AnalyzerStats,
    #[serde(default)]
    pub verifier_stats: VerifierStats,

    // Progress and achievements
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub completed_modules: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    pub streak_days: u32,
    pub longest_streak: u32,

    #[serde(default)]
    pub module_progress: BTreeMap<String, ModuleProgress>,
}

impl UserProfile {
    /// Fresh profile for a newly authenticated user: level 1, all counters
    /// zeroed, defaults for preferences and links.
    pub fn initial(user_id: &str, identity: &NewProfile, now: DateTime<Utc>) -> Self {
        let progress = leveling::calculate_level(0);
        Self {
            user_id: user_id.to_string(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            bio: String::new(),
            location: String::new(),
            website: String::new(),
            joined_date: now,
            last_active: now,
            social_links: SocialLinks::default(),
            preferences: Preferences::default(),
            level: progress.level,
            total_points: 0,
            current_level_points: progress.current_level_points,
            points_to_next_level: progress.points_to_next_level,
            training_stats: TrainingStats::default(),
            analyzer_stats: AnalyzerStats::default(),
            verifier_stats: VerifierStats::default(),
            skill_level: SkillLevel::Beginner,
            completed_modules: Vec::new(),
            achievements: Vec::new(),
            streak_days: 1,
            longest_streak: 1,
            module_progress: BTreeMap::new(),
        }
    }

    /// Points earned so far in a category.
    pub fn points_earned(&self, category: PointCategory) -> u32 {
        match category {
            PointCategory::Training => self.training_stats.points_earned,
            PointCategory::Analyzer => self.analyzer_stats.points_earned,
            PointCategory::Verifier => self.verifier_stats.points_earned,
        }
    }
}

/// Identity fields required to create a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// Typed partial update for profile metadata.
///
/// Only metadata the user may edit directly is patchable; gamification
/// fields change exclusively through point and achievement operations.
/// `None` fields are skipped during serialization so they never reach
/// storage.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<u32>,
}

/// Outcome of a point award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAward {
    pub leveled_up: bool,
    pub old_level: Option<u32>,
    pub new_level: Option<u32>,
}
