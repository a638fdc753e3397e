//! Profile manager: points, levels, and achievement unlocks.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::errors::{ProfileError, ProfileResult};
use super::models::{NewProfile, PointAward, PointCategory, ProfilePatch, UserProfile};
use crate::achievements::{self, AchievementSpec};
use crate::leveling;
use crate::profile::models::Achievement;
use crate::store::value::{strip_empty, timestamp_value};
use crate::store::{DocumentStore, StoreError};

/// Collection holding one profile document per user.
pub(crate) const PROFILE_COLLECTION: &str = "userProfiles";

/// Profile manager
///
/// Owns the authoritative per-user profile record. Every mutation reads the
/// current profile first and fails fast when a required profile is absent;
/// no operation partially applies its effect.
#[derive(Clone)]
pub struct ProfileManager {
    store: Arc<dyn DocumentStore>,
}

impl ProfileManager {
    /// Create a new profile manager
    ///
    /// # Arguments
    ///
    /// * `store` - Document store handle
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch a user's profile
    ///
    /// # Returns
    ///
    /// * `ProfileResult<Option<UserProfile>>` - The profile, or `None` when
    ///   the user has never been initialized. Storage errors propagate.
    pub async fn get_profile(&self, user_id: &str) -> ProfileResult<Option<UserProfile>> {
        let document = self.store.get(PROFILE_COLLECTION, user_id).await?;
        match document {
            Some(value) => {
                let profile = serde_json::from_value(value).map_err(StoreError::from)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Create the initial profile for a newly authenticated user
    ///
    /// Does not guard against an existing profile; callers are responsible
    /// for the get-then-create pattern on first sign-in.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Stable user id from the identity provider
    /// * `identity` - Email, display name, and optional photo URL
    ///
    /// # Returns
    ///
    /// * `ProfileResult<UserProfile>` - The created profile
    pub async fn create_profile(
        &self,
        user_id: &str,
        identity: &NewProfile,
    ) -> ProfileResult<UserProfile> {
        let profile = UserProfile::initial(user_id, identity, Utc::now());
        let document = strip_empty(serde_json::to_value(&profile).map_err(StoreError::from)?);
        self.store
            .set(PROFILE_COLLECTION, user_id, document, false)
            .await?;

        log::info!("Created profile for user {user_id}");
        Ok(profile)
    }

    /// Apply a metadata patch to a profile
    ///
    /// Performs a field-level merge: unset patch fields are stripped before
    /// the write, and `last_active` is always stamped.
    ///
    /// # Errors
    ///
    /// * `StoreError::DocumentNotFound` - No profile exists for `user_id`
    pub async fn update_profile(&self, user_id: &str, patch: &ProfilePatch) -> ProfileResult<()> {
        let value = strip_empty(serde_json::to_value(patch).map_err(StoreError::from)?);
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert("lastActive".to_string(), timestamp_value(&Utc::now()));

        self.store
            .update_fields(PROFILE_COLLECTION, user_id, fields)
            .await?;
        Ok(())
    }

    /// Award points to a user in an activity category
    ///
    /// Adds `points` to the running total, recomputes the level from the
    /// new total (never incrementally), and bumps the category's
    /// `pointsEarned` counter. When the recomputed level exceeds the stored
    /// one, the synthetic `level-{n}` achievement is unlocked in a second,
    /// separate write so the two causes of the point change stay distinct
    /// in storage.
    ///
    /// # Arguments
    ///
    /// * `user_id` - User id
    /// * `points` - Points to award
    /// * `category` - Activity category the points are attributed to
    ///
    /// # Returns
    ///
    /// * `ProfileResult<PointAward>` - Whether the award crossed a level
    ///   boundary, and which levels were involved
    ///
    /// # Errors
    ///
    /// * `ProfileError::ProfileNotFound` - Profile must already exist;
    ///   point-earning actions never create profiles
    pub async fn add_points(
        &self,
        user_id: &str,
        points: u32,
        category: PointCategory,
    ) -> ProfileResult<PointAward> {
        let profile = self.require_profile(user_id).await?;

        let new_total = profile.total_points + points;
        let progress = leveling::calculate_level(new_total);
        let leveled_up = progress.level > profile.level;
        let category_earned = profile.points_earned(category) + points;

        let mut fields = Map::new();
        fields.insert("totalPoints".to_string(), Value::from(new_total));
        fields.insert("level".to_string(), Value::from(progress.level));
        fields.insert(
            "currentLevelPoints".to_string(),
            Value::from(progress.current_level_points),
        );
        fields.insert(
            "pointsToNextLevel".to_string(),
            Value::from(progress.points_to_next_level),
        );
        fields.insert(
            format!("{}.pointsEarned", category.stats_field()),
            Value::from(category_earned),
        );
        fields.insert("lastActive".to_string(), timestamp_value(&Utc::now()));

        self.store
            .update_fields(PROFILE_COLLECTION, user_id, fields)
            .await?;

        log::debug!("Awarded {points} {category} points to user {user_id}");

        if leveled_up {
            // Second sequential write; a crash in between leaves the level
            // correct and the bonus recoverable on the next award.
            self.add_achievement(user_id, &achievements::level_achievement(progress.level))
                .await?;
            log::info!(
                "User {user_id} leveled up: {} -> {}",
                profile.level,
                progress.level
            );
        }

        Ok(PointAward {
            leveled_up,
            old_level: leveled_up.then_some(profile.level),
            new_level: leveled_up.then_some(progress.level),
        })
    }

    /// Unlock an achievement for a user
    ///
    /// Idempotent by achievement id: unlocking an achievement the user
    /// already holds is a no-op with no duplicate entry and no duplicate
    /// points. Otherwise the achievement is appended with the current time
    /// and its point value is added to the running total.
    ///
    /// # Errors
    ///
    /// * `ProfileError::ProfileNotFound` - Profile must already exist
    pub async fn add_achievement(
        &self,
        user_id: &str,
        spec: &AchievementSpec,
    ) -> ProfileResult<()> {
        let profile = self.require_profile(user_id).await?;

        if profile.achievements.iter().any(|a| a.id == spec.id) {
            log::debug!("Achievement {} already unlocked for user {user_id}", spec.id);
            return Ok(());
        }

        let achievement = Achievement::from_spec(spec, Utc::now());
        let value = serde_json::to_value(&achievement).map_err(StoreError::from)?;
        self.store
            .append_to_array(PROFILE_COLLECTION, user_id, "achievements", value)
            .await?;

        let mut fields = Map::new();
        fields.insert(
            "totalPoints".to_string(),
            Value::from(profile.total_points + spec.points),
        );
        fields.insert("lastActive".to_string(), timestamp_value(&Utc::now()));
        self.store
            .update_fields(PROFILE_COLLECTION, user_id, fields)
            .await?;

        log::info!(
            "Achievement unlocked for user {user_id}: {} (+{} points)",
            spec.name,
            spec.points
        );
        Ok(())
    }

    /// Read a profile that must exist.
    async fn require_profile(&self, user_id: &str) -> ProfileResult<UserProfile> {
        self.get_profile(user_id)
            .await?
            .ok_or_else(|| ProfileError::ProfileNotFound(user_id.to_string()))
    }
}
