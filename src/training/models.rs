//! Training data models and skill-tier derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::profile::SkillLevel;
use crate::store::value::{timestamp, timestamp_opt};

/// Beginner-tier module ids.
pub const BEGINNER_MODULES: [&str; 3] = [
    "basic-fact-checking",
    "source-evaluation",
    "emotional-manipulation",
];

/// Intermediate-tier module ids.
pub const INTERMEDIATE_MODULES: [&str; 3] = [
    "statistical-misinformation",
    "visual-manipulation",
    "context-manipulation",
];

/// Advanced-tier module ids.
pub const ADVANCED_MODULES: [&str; 3] = [
    "deepfake-detection",
    "coordinated-campaigns",
    "financial-scams",
];

/// Derive a skill tier from the set of completed modules.
///
/// Always recomputed from the full set, never incremented: advanced after
/// at least 2 advanced modules; intermediate after all 3 beginner modules
/// plus at least 2 intermediate; beginner otherwise. The completed set is
/// append-only, so the derived tier cannot regress.
pub fn derive_skill_level(completed_modules: &[String]) -> SkillLevel {
    let count_in = |tier: &[&str]| {
        tier.iter()
            .filter(|id| completed_modules.iter().any(|m| m == *id))
            .count()
    };

    if count_in(&ADVANCED_MODULES) >= 2 {
        SkillLevel::Advanced
    } else if count_in(&BEGINNER_MODULES) >= 3 && count_in(&INTERMEDIATE_MODULES) >= 2 {
        SkillLevel::Intermediate
    } else {
        SkillLevel::Beginner
    }
}

/// Accuracy for a finished session: percentage of completed scenarios
/// answered without a mistake, rounded, clamped to 0-100.
pub fn compute_accuracy(scenarios_completed: u32, mistakes: u32) -> u32 {
    if scenarios_completed == 0 {
        return 0;
    }
    let correct = scenarios_completed.saturating_sub(mistakes);
    let accuracy = (f64::from(correct) / f64::from(scenarios_completed) * 100.0).round() as u32;
    accuracy.min(100)
}

/// Clamp a client-reported session duration to [1, 60] minutes.
///
/// Clock anomalies are capped, not rejected.
pub fn clamp_session_minutes(minutes: i64) -> u32 {
    minutes.clamp(1, 60) as u32
}

/// Per-user training progress record, one document per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub completed_modules: Vec<String>,
    pub current_score: u32,
    /// Achievement ids earned through training milestones.
    #[serde(default)]
    pub achievements: Vec<String>,
    /// Total training time in minutes.
    pub total_time: u32,
    pub streak_days: u32,
    #[serde(with = "timestamp")]
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub module_progress: BTreeMap<String, ModuleProgress>,
}

impl UserProgress {
    /// Fresh progress record for a user who has not trained yet.
    pub fn initial(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            skill_level: SkillLevel::Beginner,
            completed_modules: Vec::new(),
            current_score: 0,
            achievements: Vec::new(),
            total_time: 0,
            streak_days: 1,
            last_active: now,
            module_progress: BTreeMap::new(),
        }
    }
}

/// Session state for one (user, module) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: String,
    pub current_scenario: u32,
    #[serde(default)]
    pub completed_scenarios: Vec<String>,
    pub score: u32,
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
    /// Absent until the session is finalized; never stored as null.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp_opt"
    )]
    pub end_time: Option<DateTime<Utc>>,
    /// Session time in minutes, meaningful once finalized.
    pub time_spent: u32,
    pub mistakes: u32,
    pub hints_used: u32,
    /// 0-100, meaningful once finalized.
    pub accuracy: u32,
    pub attempts: u32,
}

impl ModuleProgress {
    /// Start a new session for a module.
    pub fn start(module_id: &str, start_time: DateTime<Utc>) -> Self {
        Self {
            module_id: module_id.to_string(),
            current_scenario: 0,
            completed_scenarios: Vec::new(),
            score: 0,
            start_time,
            end_time: None,
            time_spent: 0,
            mistakes: 0,
            hints_used: 0,
            accuracy: 0,
            attempts: 1,
        }
    }

    /// Finalize the session: set the end time, compute accuracy from the
    /// mistake count, and clamp the session duration.
    pub fn finalize(&mut self, end_time: DateTime<Utc>) {
        let minutes = (end_time - self.start_time).num_minutes();
        self.time_spent = clamp_session_minutes(minutes);
        self.accuracy = compute_accuracy(self.completed_scenarios.len() as u32, self.mistakes);
        self.end_time = Some(end_time);
    }
}

/// Write-once audit record of a completed scenario.
///
/// Used to exclude already-seen scenarios from future sessions; never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedScenario {
    pub scenario_id: String,
    pub module_id: String,
    pub user_id: String,
    #[serde(with = "timestamp")]
    pub completed_at: DateTime<Utc>,
    pub score: u32,
    pub time_spent: u32,
    pub hints_used: u32,
    pub was_correct: bool,
}

/// A single content-analysis run, kept for personalized scenario
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub content: String,
    pub result: Value,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub misinformation_types: Vec<String>,
    pub confidence: f64,
}

/// A single claim-verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub id: String,
    pub content: String,
    pub result: bool,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub verification_methods: Vec<String>,
}

/// Per-user history of analyses and verifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistory {
    pub user_id: String,
    #[serde(default)]
    pub analyses: Vec<AnalysisRecord>,
    #[serde(default)]
    pub verifications: Vec<VerificationRecord>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default)]
    pub preferred_topics: Vec<String>,
}

impl AnalysisHistory {
    /// Empty history for a user's first recorded activity.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            analyses: Vec::new(),
            verifications: Vec::new(),
            common_mistakes: Vec::new(),
            preferred_topics: Vec::new(),
        }
    }
}

/// One leaderboard row, derived from a profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    #[serde(
        rename = "photoURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    pub total_points: u32,
    pub level: u32,
    pub activities_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn modules(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_skill_level_defaults_to_beginner() {
        assert_eq!(derive_skill_level(&[]), SkillLevel::Beginner);
        assert_eq!(
            derive_skill_level(&modules(&["basic-fact-checking"])),
            SkillLevel::Beginner
        );
    }

    #[test]
    fn test_skill_level_intermediate_needs_full_beginner_set() {
        // All beginner plus two intermediate
        let completed = modules(&[
            "basic-fact-checking",
            "source-evaluation",
            "emotional-manipulation",
            "statistical-misinformation",
            "visual-manipulation",
        ]);
        assert_eq!(derive_skill_level(&completed), SkillLevel::Intermediate);

        // Two beginner missing one, plus two intermediate: still beginner
        let incomplete = modules(&[
            "basic-fact-checking",
            "source-evaluation",
            "statistical-misinformation",
            "visual-manipulation",
        ]);
        assert_eq!(derive_skill_level(&incomplete), SkillLevel::Beginner);
    }

    #[test]
    fn test_skill_level_advanced_needs_two_advanced_modules() {
        let one = modules(&["deepfake-detection"]);
        assert_eq!(derive_skill_level(&one), SkillLevel::Beginner);

        let two = modules(&["deepfake-detection", "financial-scams"]);
        assert_eq!(derive_skill_level(&two), SkillLevel::Advanced);
    }

    #[test]
    fn test_skill_level_never_regresses_as_set_grows() {
        let all: Vec<String> = BEGINNER_MODULES
            .iter()
            .chain(INTERMEDIATE_MODULES.iter())
            .chain(ADVANCED_MODULES.iter())
            .map(|id| id.to_string())
            .collect();

        let mut completed = Vec::new();
        let mut best = SkillLevel::Beginner;
        for module in all {
            completed.push(module);
            let tier = derive_skill_level(&completed);
            assert!(tier >= best, "tier regressed after {completed:?}");
            best = tier;
        }
        assert_eq!(best, SkillLevel::Advanced);
    }

    #[test]
    fn test_accuracy_rounding_and_bounds() {
        assert_eq!(compute_accuracy(5, 2), 60);
        assert_eq!(compute_accuracy(3, 0), 100);
        assert_eq!(compute_accuracy(3, 5), 0);
        assert_eq!(compute_accuracy(0, 0), 0);
        assert_eq!(compute_accuracy(3, 1), 67);
    }

    #[test]
    fn test_session_minutes_clamped() {
        assert_eq!(clamp_session_minutes(0), 1);
        assert_eq!(clamp_session_minutes(-10), 1);
        assert_eq!(clamp_session_minutes(8), 8);
        assert_eq!(clamp_session_minutes(600), 60);
    }

    #[test]
    fn test_finalize_computes_accuracy_and_duration() {
        let start = Utc::now();
        let mut progress = ModuleProgress::start("basic-fact-checking", start);
        progress.completed_scenarios = modules(&["s1", "s2", "s3", "s4", "s5"]);
        progress.mistakes = 2;

        progress.finalize(start + Duration::minutes(8));
        assert_eq!(progress.accuracy, 60);
        assert_eq!(progress.time_spent, 8);
        assert!(progress.end_time.is_some());
    }

    #[test]
    fn test_unfinished_progress_serializes_without_end_time() {
        let progress = ModuleProgress::start("basic-fact-checking", Utc::now());
        let value = serde_json::to_value(&progress).unwrap();
        assert!(value.get("endTime").is_none());
    }
}
