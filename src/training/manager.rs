//! Training manager: module sessions, completion rewards, and activity
//! recording.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::TrainingResult;
use super::models::{
    ADVANCED_MODULES, AnalysisHistory, AnalysisRecord, BEGINNER_MODULES, CompletedScenario,
    INTERMEDIATE_MODULES, LeaderboardEntry, ModuleProgress, UserProgress, VerificationRecord,
    derive_skill_level,
};
use crate::profile::manager::PROFILE_COLLECTION;
use crate::profile::{PointCategory, ProfileManager, SkillLevel};
use crate::store::value::{get_path, strip_empty, timestamp_value};
use crate::store::{DocumentStore, Filter, OrderBy, StoreError};

/// Collection holding one progress document per user.
const PROGRESS_COLLECTION: &str = "userProgress";
/// Append-only log of completed scenarios.
const SCENARIO_COLLECTION: &str = "completedScenarios";
/// Per-user analysis/verification history documents.
const HISTORY_COLLECTION: &str = "userAnalysisHistory";

/// Points for completing a module the first time.
const MODULE_BASE_POINTS: u32 = 100;
/// Extra points for finishing a module in under this many minutes.
const SPEED_BONUS_THRESHOLD_MINUTES: u32 = 5;
const SPEED_BONUS_POINTS: u32 = 25;

/// Base points for running the analyzer, and the high-accuracy bonus.
const ANALYZER_BASE_POINTS: u32 = 25;
const ANALYZER_ACCURACY_BONUS: u32 = 15;
/// Base points for running the verifier, and the high-confidence bonus.
const VERIFIER_BASE_POINTS: u32 = 20;
const VERIFIER_CONFIDENCE_BONUS: u32 = 10;

/// Training manager
///
/// Tracks per-module session state and the append-only scenario log,
/// derives skill tiers from completed modules, and hands point awards and
/// achievement unlocks to the profile layer on first completion.
#[derive(Clone)]
pub struct TrainingManager {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileManager,
}

impl TrainingManager {
    /// Create a new training manager
    ///
    /// # Arguments
    ///
    /// * `store` - Document store handle
    /// * `profiles` - Profile manager used for point and achievement awards
    pub fn new(store: Arc<dyn DocumentStore>, profiles: ProfileManager) -> Self {
        Self { store, profiles }
    }

    /// Fetch a user's overall training progress
    pub async fn get_user_progress(&self, user_id: &str) -> TrainingResult<Option<UserProgress>> {
        let document = self.store.get(PROGRESS_COLLECTION, user_id).await?;
        match document {
            Some(value) => {
                let progress = serde_json::from_value(value).map_err(StoreError::from)?;
                Ok(Some(progress))
            }
            None => Ok(None),
        }
    }

    /// Create a fresh progress record for a user
    pub async fn initialize_user_progress(&self, user_id: &str) -> TrainingResult<UserProgress> {
        let progress = UserProgress::initial(user_id, Utc::now());
        let document = strip_empty(serde_json::to_value(&progress).map_err(StoreError::from)?);
        self.store
            .set(PROGRESS_COLLECTION, user_id, document, false)
            .await?;

        log::info!("Initialized training progress for user {user_id}");
        Ok(progress)
    }

    /// Fetch session state for one module, if the user has started it
    pub async fn get_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> TrainingResult<Option<ModuleProgress>> {
        let progress = self.get_user_progress(user_id).await?;
        Ok(progress.and_then(|p| p.module_progress.get(module_id).cloned()))
    }

    /// Upsert session state for one module
    ///
    /// Writes only the `moduleProgress.{moduleId}` field path, never the
    /// whole document. Unset fields are stripped first, so an unfinished
    /// session's end time is entirely absent from storage.
    pub async fn save_module_progress(
        &self,
        user_id: &str,
        progress: &ModuleProgress,
    ) -> TrainingResult<()> {
        if self.get_user_progress(user_id).await?.is_none() {
            self.initialize_user_progress(user_id).await?;
        }

        let document = strip_empty(serde_json::to_value(progress).map_err(StoreError::from)?);
        let mut fields = Map::new();
        fields.insert(
            format!("moduleProgress.{}", progress.module_id),
            document,
        );
        fields.insert("lastActive".to_string(), timestamp_value(&Utc::now()));

        self.store
            .update_fields(PROGRESS_COLLECTION, user_id, fields)
            .await?;
        Ok(())
    }

    /// Append a completed scenario to the audit log
    ///
    /// Records are write-once; nothing ever updates or deletes them.
    pub async fn record_completed_scenario(
        &self,
        record: &CompletedScenario,
    ) -> TrainingResult<()> {
        let id = Uuid::new_v4().to_string();
        let document = strip_empty(serde_json::to_value(record).map_err(StoreError::from)?);
        self.store
            .set(SCENARIO_COLLECTION, &id, document, false)
            .await?;
        Ok(())
    }

    /// Fetch a user's completed scenarios, most recent first
    ///
    /// Optionally restricted to one module. Records that fail to parse
    /// (scenario content comes from a generated, less-trusted source) are
    /// logged and skipped rather than failing the whole read.
    pub async fn get_completed_scenarios(
        &self,
        user_id: &str,
        module_id: Option<&str>,
    ) -> TrainingResult<Vec<CompletedScenario>> {
        let mut filters = vec![Filter::eq("userId", user_id)];
        if let Some(module_id) = module_id {
            filters.push(Filter::eq("moduleId", module_id));
        }

        let documents = self
            .store
            .query(
                SCENARIO_COLLECTION,
                &filters,
                Some(&OrderBy::desc("completedAt")),
                None,
            )
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            match serde_json::from_value::<CompletedScenario>(document) {
                Ok(record) => records.push(record),
                Err(error) => {
                    log::warn!("Skipping malformed completed-scenario record: {error}");
                }
            }
        }
        Ok(records)
    }

    /// Scenario ids the user has already seen for a module
    ///
    /// Fresh sessions exclude these so scenarios are not repeated.
    pub async fn excluded_scenario_ids(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> TrainingResult<HashSet<String>> {
        let completed = self
            .get_completed_scenarios(user_id, Some(module_id))
            .await?;
        Ok(completed
            .into_iter()
            .map(|record| record.scenario_id)
            .collect())
    }

    /// Complete a training module
    ///
    /// Always accumulates the score and time into the progress record and
    /// recomputes the skill tier from the full completed set. Points and
    /// achievements are awarded only the first time a module is completed,
    /// so replaying a module is idempotent with respect to rewards.
    ///
    /// First-completion award: `100 base + floor(score / 2) accuracy bonus
    /// + 25 speed bonus when finished in under 5 minutes`, attributed to
    /// the training category.
    ///
    /// # Arguments
    ///
    /// * `user_id` - User id
    /// * `module_id` - Completed module
    /// * `final_score` - Score for this run
    /// * `total_time_minutes` - Session duration in minutes
    pub async fn complete_module(
        &self,
        user_id: &str,
        module_id: &str,
        final_score: u32,
        total_time_minutes: u32,
    ) -> TrainingResult<()> {
        let progress = match self.get_user_progress(user_id).await? {
            Some(progress) => progress,
            None => self.initialize_user_progress(user_id).await?,
        };

        let was_already_completed = progress
            .completed_modules
            .iter()
            .any(|completed| completed == module_id);

        let mut completed_modules = progress.completed_modules.clone();
        if !was_already_completed {
            completed_modules.push(module_id.to_string());
            self.store
                .append_to_array(
                    PROGRESS_COLLECTION,
                    user_id,
                    "completedModules",
                    Value::from(module_id),
                )
                .await?;
        }

        let old_skill_level = progress.skill_level;
        let new_skill_level = derive_skill_level(&completed_modules);

        let mut fields = Map::new();
        fields.insert(
            "currentScore".to_string(),
            Value::from(progress.current_score + final_score),
        );
        fields.insert(
            "totalTime".to_string(),
            Value::from(progress.total_time + total_time_minutes),
        );
        fields.insert(
            "skillLevel".to_string(),
            serde_json::to_value(new_skill_level).map_err(StoreError::from)?,
        );
        fields.insert("lastActive".to_string(), timestamp_value(&Utc::now()));
        self.store
            .update_fields(PROGRESS_COLLECTION, user_id, fields)
            .await?;

        if was_already_completed {
            log::debug!("Module {module_id} replayed by user {user_id}, no new rewards");
            return Ok(());
        }

        // Achievement checks must not block the point award.
        if let Err(error) = self
            .check_and_add_achievements(
                user_id,
                &completed_modules,
                old_skill_level,
                new_skill_level,
            )
            .await
        {
            log::warn!("Achievement check failed for user {user_id}: {error}");
        }

        let accuracy_bonus = final_score / 2;
        let speed_bonus = if total_time_minutes < SPEED_BONUS_THRESHOLD_MINUTES {
            SPEED_BONUS_POINTS
        } else {
            0
        };
        let award = MODULE_BASE_POINTS + accuracy_bonus + speed_bonus;

        self.profiles
            .add_points(user_id, award, PointCategory::Training)
            .await?;

        log::info!(
            "User {user_id} completed module {module_id}: +{award} training points"
        );
        Ok(())
    }

    /// Record a content-analysis run and award analyzer points
    ///
    /// A missing profile is a logged no-op: points cannot be awarded
    /// without profile identity, and activity recording never creates
    /// profiles.
    pub async fn record_analyzer_activity(
        &self,
        user_id: &str,
        accuracy: Option<f64>,
    ) -> TrainingResult<()> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            log::warn!("Cannot award analyzer points: no profile for user {user_id}");
            return Ok(());
        };

        let accurate = accuracy.is_some_and(|a| a > 0.8);
        let points = if accurate {
            ANALYZER_BASE_POINTS + ANALYZER_ACCURACY_BONUS
        } else {
            ANALYZER_BASE_POINTS
        };
        self.profiles
            .add_points(user_id, points, PointCategory::Analyzer)
            .await?;

        let stats = &profile.analyzer_stats;
        let total = stats.total_analyses + 1;
        let average_confidence = (stats.average_confidence * f64::from(stats.total_analyses)
            + accuracy.unwrap_or(0.0))
            / f64::from(total);

        let mut fields = Map::new();
        fields.insert(
            "analyzerStats.totalAnalyses".to_string(),
            Value::from(total),
        );
        fields.insert(
            "analyzerStats.accurateDetections".to_string(),
            Value::from(stats.accurate_detections + u32::from(accurate)),
        );
        fields.insert(
            "analyzerStats.averageConfidence".to_string(),
            Value::from(average_confidence),
        );
        self.store
            .update_fields(PROFILE_COLLECTION, user_id, fields)
            .await?;
        Ok(())
    }

    /// Record a claim-verification run and award verifier points
    ///
    /// Same missing-profile rule as
    /// [`TrainingManager::record_analyzer_activity`].
    pub async fn record_verifier_activity(
        &self,
        user_id: &str,
        was_accurate: bool,
        confidence: f64,
    ) -> TrainingResult<()> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            log::warn!("Cannot award verifier points: no profile for user {user_id}");
            return Ok(());
        };

        let points = if confidence > 0.8 {
            VERIFIER_BASE_POINTS + VERIFIER_CONFIDENCE_BONUS
        } else {
            VERIFIER_BASE_POINTS
        };
        self.profiles
            .add_points(user_id, points, PointCategory::Verifier)
            .await?;

        let stats = &profile.verifier_stats;
        let mut fields = Map::new();
        fields.insert(
            "verifierStats.totalVerifications".to_string(),
            Value::from(stats.total_verifications + 1),
        );
        fields.insert(
            "verifierStats.sourcesChecked".to_string(),
            Value::from(stats.sources_checked + 1),
        );
        fields.insert(
            "verifierStats.factChecksPerformed".to_string(),
            Value::from(stats.fact_checks_performed + 1),
        );
        fields.insert(
            "verifierStats.accurateVerifications".to_string(),
            Value::from(stats.accurate_verifications + u32::from(was_accurate)),
        );
        self.store
            .update_fields(PROFILE_COLLECTION, user_id, fields)
            .await?;
        Ok(())
    }

    /// Top profiles by total points, descending
    pub async fn leaderboard(&self, limit: usize) -> TrainingResult<Vec<LeaderboardEntry>> {
        let documents = self
            .store
            .query(
                PROFILE_COLLECTION,
                &[],
                Some(&OrderBy::desc("totalPoints")),
                Some(limit),
            )
            .await?;

        Ok(documents.iter().map(leaderboard_entry).collect())
    }

    /// Append an analysis run to the user's history document
    ///
    /// The history document is created lazily on first write.
    pub async fn save_analysis_record(
        &self,
        user_id: &str,
        record: &AnalysisRecord,
    ) -> TrainingResult<()> {
        let value = strip_empty(serde_json::to_value(record).map_err(StoreError::from)?);

        if self.store.get(HISTORY_COLLECTION, user_id).await?.is_some() {
            self.store
                .append_to_array(HISTORY_COLLECTION, user_id, "analyses", value)
                .await?;
            self.touch_history(user_id).await?;
        } else {
            let mut history = AnalysisHistory::empty(user_id);
            history.analyses.push(record.clone());
            let document =
                strip_empty(serde_json::to_value(&history).map_err(StoreError::from)?);
            self.store
                .set(HISTORY_COLLECTION, user_id, document, false)
                .await?;
        }
        Ok(())
    }

    /// Append a verification run to the user's history document
    pub async fn save_verification_record(
        &self,
        user_id: &str,
        record: &VerificationRecord,
    ) -> TrainingResult<()> {
        let value = strip_empty(serde_json::to_value(record).map_err(StoreError::from)?);

        if self.store.get(HISTORY_COLLECTION, user_id).await?.is_some() {
            self.store
                .append_to_array(HISTORY_COLLECTION, user_id, "verifications", value)
                .await?;
            self.touch_history(user_id).await?;
        } else {
            let mut history = AnalysisHistory::empty(user_id);
            history.verifications.push(record.clone());
            let document =
                strip_empty(serde_json::to_value(&history).map_err(StoreError::from)?);
            self.store
                .set(HISTORY_COLLECTION, user_id, document, false)
                .await?;
        }
        Ok(())
    }

    /// Fetch a user's analysis/verification history
    pub async fn get_analysis_history(
        &self,
        user_id: &str,
    ) -> TrainingResult<Option<AnalysisHistory>> {
        let document = self.store.get(HISTORY_COLLECTION, user_id).await?;
        match document {
            Some(value) => {
                let history = serde_json::from_value(value).map_err(StoreError::from)?;
                Ok(Some(history))
            }
            None => Ok(None),
        }
    }

    async fn touch_history(&self, user_id: &str) -> TrainingResult<()> {
        let mut fields = Map::new();
        fields.insert("lastUpdated".to_string(), timestamp_value(&Utc::now()));
        self.store
            .update_fields(HISTORY_COLLECTION, user_id, fields)
            .await?;
        Ok(())
    }

    /// Award training-milestone achievement ids after a first completion.
    async fn check_and_add_achievements(
        &self,
        user_id: &str,
        completed_modules: &[String],
        old_skill_level: SkillLevel,
        new_skill_level: SkillLevel,
    ) -> TrainingResult<()> {
        let mut earned: Vec<&str> = Vec::new();

        if completed_modules.len() == 1 {
            earned.push("first-module");
        }
        if old_skill_level != new_skill_level {
            earned.push("level-up");
        }

        let has_all = |tier: &[&str]| {
            tier.iter()
                .all(|id| completed_modules.iter().any(|m| m == *id))
        };
        if has_all(&BEGINNER_MODULES) {
            earned.push("all-beginner");
        }
        if has_all(&INTERMEDIATE_MODULES) {
            earned.push("all-intermediate");
        }
        if has_all(&ADVANCED_MODULES) {
            earned.push("all-advanced");
        }

        for id in earned {
            self.store
                .append_to_array(
                    PROGRESS_COLLECTION,
                    user_id,
                    "achievements",
                    Value::from(id),
                )
                .await?;
            log::info!("Training achievement earned by user {user_id}: {id}");
        }
        Ok(())
    }
}

/// Map a profile document to a leaderboard row, tolerating partial
/// documents from older clients.
fn leaderboard_entry(document: &Value) -> LeaderboardEntry {
    let string_field = |field: &str| {
        document
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let counter = |path: &str| {
        get_path(document, path)
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    };

    let display_name = string_field("displayName")
        .or_else(|| {
            string_field("email")
                .map(|email| email.split('@').next().unwrap_or(&email).to_string())
        })
        .unwrap_or_else(|| "Anonymous User".to_string());

    LeaderboardEntry {
        user_id: string_field("userId").unwrap_or_default(),
        display_name,
        photo_url: string_field("photoURL"),
        total_points: counter("totalPoints"),
        level: counter("level").max(1),
        activities_completed: counter("trainingStats.modulesCompleted")
            + counter("analyzerStats.totalAnalyses")
            + counter("verifierStats.totalVerifications"),
    }
}
