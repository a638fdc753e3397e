//! Training module: per-module session tracking and completion rewards.
//!
//! This module implements:
//! - Per-(user, module) session state with finalization (accuracy, clamped
//!   session time)
//! - An append-only completed-scenario log used to avoid repeating
//!   scenarios across sessions
//! - First-completion-only point and achievement awards for modules
//! - Skill-tier derivation from the full completed-module set
//! - Analyzer/verifier activity recording and the points leaderboard
//!
//! ## Example
//!
//! ```
//! use veritas_core::profile::{NewProfile, ProfileManager};
//! use veritas_core::store::MemoryStore;
//! use veritas_core::training::TrainingManager;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let profiles = ProfileManager::new(store.clone());
//! let training = TrainingManager::new(store, profiles.clone());
//!
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
//! // First completion awards training points and achievements.
//! training
//!     .complete_module("user-1", "basic-fact-checking", 30, 8)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TrainingError, TrainingResult};
pub use manager::TrainingManager;
pub use models::{
    ADVANCED_MODULES, AnalysisHistory, AnalysisRecord, BEGINNER_MODULES, CompletedScenario,
    INTERMEDIATE_MODULES, LeaderboardEntry, ModuleProgress, UserProgress, VerificationRecord,
    clamp_session_minutes, compute_accuracy, derive_skill_level,
};
