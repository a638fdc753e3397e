//! # Veritas Core
//!
//! Gamification and progress-tracking core for a misinformation-education
//! platform: deterministic leveling, idempotent achievement unlocks, point
//! accumulation across activity categories, and training-module progress
//! with skill-tier derivation.
//!
//! ## Architecture
//!
//! All state lives in a document store behind the [`store::DocumentStore`]
//! trait; managers receive a store handle at construction, so tests run
//! against [`store::MemoryStore`] while production uses the PostgreSQL
//! adapter. Data flows in one direction:
//!
//! - An activity finishes (module completed, analysis run, claim verified)
//! - [`training::TrainingManager`] records it and decides the reward
//! - [`profile::ProfileManager`] applies points, recomputes the level from
//!   the full total via [`leveling`], and unlocks achievements from the
//!   [`achievements`] catalog
//!
//! ## Core Modules
//!
//! - [`leveling`]: pure exponential level curve
//! - [`achievements`]: static achievement catalog
//! - [`store`]: document store trait, adapters, and value utilities
//! - [`profile`]: per-user profile, points, levels, achievements
//! - [`training`]: module sessions, completion rewards, activity recording
//!
//! ## Example
//!
//! ```
//! use veritas_core::leveling;
//!
//! let progress = leveling::calculate_level(150);
//! assert_eq!(progress.level, 2);
//! assert_eq!(progress.current_level_points, 50);
//! ```

/// Pure level curve mapping cumulative points to levels.
pub mod leveling;
pub use leveling::{LevelProgress, calculate_level, level_requirement};

/// Static achievement catalog.
pub mod achievements;
pub use achievements::{AchievementCategory, AchievementSpec, Rarity};

/// Document store trait and adapters.
pub mod store;
pub use store::{DocumentStore, MemoryStore, PgDocumentStore};

/// Per-user profile, points, levels, and achievements.
pub mod profile;
pub use profile::{ProfileError, ProfileManager, UserProfile};

/// Training module sessions and completion rewards.
pub mod training;
pub use training::{TrainingError, TrainingManager};
