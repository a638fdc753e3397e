//! Profile error types.

use thiserror::Error;

use crate::store::StoreError;

/// Profile errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Profile not found where presence was required.
    ///
    /// Point-earning operations never auto-create profiles; a missing
    /// profile is a hard error so phantom, half-initialized profiles
    /// cannot appear.
    #[error("Profile not found for user {0}")]
    ProfileNotFound(String),
}

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;
