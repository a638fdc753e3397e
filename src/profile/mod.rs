//! Profile module: per-user identity, points, levels, and achievements.
//!
//! This module implements:
//! - Lazily created user profiles with zeroed gamification counters
//! - Point awards attributed to training/analyzer/verifier categories
//! - Level recomputation from the full point total on every award
//! - Idempotent achievement unlocks with one-time point bonuses
//! - Typed metadata patches with unset fields stripped before storage
//!
//! ## Example
//!
//! ```
//! use veritas_core::profile::{NewProfile, PointCategory, ProfileManager};
//! use veritas_core::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profiles = ProfileManager::new(Arc::new(MemoryStore::new()));
//! profiles
//!     .create_profile(
//!         "user-1",
//!         &NewProfile {
//!             email: "user@example.com".to_string(),
//!             display_name: "User".to_string(),
//!             photo_url: None,
//!         },
//!     )
//!     .await?;
//!
//! let award = profiles
//!     .add_points("user-1", 50, PointCategory::Training)
//!     .await?;
//! assert!(!award.leveled_up);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ProfileError, ProfileResult};
pub use manager::ProfileManager;
pub use models::{
    Achievement, AnalyzerStats, NewProfile, PointAward, PointCategory, Preferences, ProfilePatch,
    SkillLevel, SocialLinks, Theme, TrainingStats, UserProfile, VerifierStats,
};
