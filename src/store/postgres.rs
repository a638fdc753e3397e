//! PostgreSQL-backed document store.
//!
//! Documents live in a single `documents` table keyed by (collection, id)
//! with a JSONB body. Equality filters compile to JSONB containment checks;
//! merge writes, field updates, and array appends run as read-modify-write
//! inside a transaction with a row lock, so a single operation never
//! interleaves with another writer on the same document.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

use super::config::DatabaseConfig;
use super::errors::{StoreError, StoreResult};
use super::value::{apply_field_updates, deep_merge, get_path, set_path};
use super::{DocumentStore, Filter, OrderBy};

/// PostgreSQL implementation of [`DocumentStore`].
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Arc<PgPool>,
}

impl PgDocumentStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Connect a new pool from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `StoreResult<PgDocumentStore>` - Connected store or error
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                doc JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

/// Validate a dotted field path and return its segments.
///
/// Paths are interpolated into ORDER BY clauses, so only identifier-like
/// segments are accepted.
fn validated_segments(path: &str) -> StoreResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    let valid = !segments.is_empty()
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if valid {
        Ok(segments)
    } else {
        Err(StoreError::InvalidFieldPath(path.to_string()))
    }
}

/// Build a JSONB containment document from equality filters.
fn containment_document(filters: &[Filter]) -> StoreResult<Value> {
    let mut containment = Value::Object(Map::new());
    for filter in filters {
        validated_segments(&filter.field)?;
        set_path(&mut containment, &filter.field, filter.value.clone());
    }
    Ok(containment)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.get::<Value, _>("doc")))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> StoreResult<()> {
        if !merge {
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, doc, updated_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (collection, id)
                DO UPDATE SET doc = EXCLUDED.doc, updated_at = NOW()
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(document)
            .execute(self.pool.as_ref())
            .await?;
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(
            "SELECT doc FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let merged = match existing {
            Some(row) => {
                let mut base: Value = row.get("doc");
                deep_merge(&mut base, document);
                base
            }
            None => document,
        };

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, doc, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (collection, id)
            DO UPDATE SET doc = EXCLUDED.doc, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(merged)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT doc FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        let mut document: Value = row.get("doc");
        apply_field_updates(&mut document, fields);

        sqlx::query(
            "UPDATE documents SET doc = $1, updated_at = NOW() WHERE collection = $2 AND id = $3",
        )
        .bind(document)
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let containment = containment_document(filters)?;

        let mut sql =
            String::from("SELECT doc FROM documents WHERE collection = $1 AND doc @> $2");
        if let Some(order) = order {
            let segments = validated_segments(&order.field)?;
            let direction = if order.descending { "DESC" } else { "ASC" };
            // Path segments are validated identifier characters only.
            sql.push_str(&format!(
                " ORDER BY doc #> '{{{}}}' {direction}",
                segments.join(",")
            ));
        }
        if limit.is_some() {
            sql.push_str(" LIMIT $3");
        }

        let mut query = sqlx::query(&sql).bind(collection).bind(containment);
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }

        let rows = query.fetch_all(self.pool.as_ref()).await?;
        Ok(rows.into_iter().map(|r| r.get::<Value, _>("doc")).collect())
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field_path: &str,
        value: Value,
    ) -> StoreResult<()> {
        validated_segments(field_path)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT doc FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        let mut document: Value = row.get("doc");
        let array = match get_path(&document, field_path) {
            Some(Value::Array(existing)) => {
                let mut items = existing.clone();
                if !items.contains(&value) {
                    items.push(value);
                }
                items
            }
            _ => vec![value],
        };
        set_path(&mut document, field_path, Value::Array(array));

        sqlx::query(
            "UPDATE documents SET doc = $1, updated_at = NOW() WHERE collection = $2 AND id = $3",
        )
        .bind(document)
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_segments_accepts_module_ids() {
        let segments = validated_segments("moduleProgress.basic-fact-checking").unwrap();
        assert_eq!(segments, vec!["moduleProgress", "basic-fact-checking"]);
    }

    #[test]
    fn test_validated_segments_rejects_injection() {
        assert!(validated_segments("totalPoints'; DROP TABLE documents; --").is_err());
        assert!(validated_segments("a..b").is_err());
        assert!(validated_segments("").is_err());
    }

    #[test]
    fn test_containment_document_nests_dotted_filters() {
        let containment = containment_document(&[
            Filter::eq("userId", "u1"),
            Filter::eq("stats.level", 2),
        ])
        .unwrap();
        assert_eq!(
            containment,
            serde_json::json!({ "userId": "u1", "stats": { "level": 2 } })
        );
    }
}
