//! Document store error types.

use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document not found where presence was required
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    /// A field update or query referenced an invalid field path
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),
}

impl StoreError {
    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        StoreError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;
