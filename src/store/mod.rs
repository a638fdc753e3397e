//! Persistence layer: a generic async document store.
//!
//! The gamification core talks to storage exclusively through the
//! [`DocumentStore`] trait, which models a managed document database:
//! collections of JSON documents addressed by id, with merge writes,
//! field-path updates, equality queries, and array-union appends. Managers
//! receive a store instance at construction time, so tests run against
//! [`MemoryStore`] while production uses [`PgDocumentStore`].
//!
//! ## Example
//!
//! ```
//! use veritas_core::store::{DocumentStore, MemoryStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//! store
//!     .set("userProfiles", "u1", json!({ "totalPoints": 50 }), false)
//!     .await?;
//! let doc = store.get("userProfiles", "u1").await?;
//! assert!(doc.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod value;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Equality filter on a (possibly dotted) document field path.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    /// Filter documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Ordering for query results.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    /// Order ascending by `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Order descending by `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Async document store contract.
///
/// Implementations must treat documents as opaque JSON objects. Array
/// fields are only ever mutated through [`DocumentStore::append_to_array`],
/// which has set semantics: appending a value already present is a no-op.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. Returns `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Write a document. With `merge` set, object fields are deep-merged
    /// into any existing document; otherwise the document is replaced.
    async fn set(&self, collection: &str, id: &str, document: Value, merge: bool)
    -> StoreResult<()>;

    /// Apply dotted-field-path updates to an existing document.
    ///
    /// # Errors
    ///
    /// * `StoreError::DocumentNotFound` - Document does not exist
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()>;

    /// Query a collection with equality filters, optional ordering, and an
    /// optional result limit.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>>;

    /// Append a value to an array field unless an equal value is already
    /// present. The array is created when the field is missing.
    ///
    /// # Errors
    ///
    /// * `StoreError::DocumentNotFound` - Document does not exist
    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field_path: &str,
        value: Value,
    ) -> StoreResult<()>;
}
