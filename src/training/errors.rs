//! Training error types.

use thiserror::Error;

use crate::profile::ProfileError;
use crate::store::StoreError;

/// Training errors
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Error from the profile layer (point awards, achievement unlocks)
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Result type for training operations
pub type TrainingResult<T> = Result<T, TrainingError>;
