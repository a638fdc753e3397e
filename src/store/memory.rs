//! In-memory document store for tests, demos, and offline development.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::value::{apply_field_updates, deep_merge, get_path, set_path};
use super::{DocumentStore, Filter, OrderBy};

/// In-memory implementation of [`DocumentStore`].
///
/// Collections are plain maps behind a mutex; every operation clones in and
/// out, matching the read-then-write-own-copy semantics the managers assume
/// of the real store.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Ordering for JSON scalars; mixed or non-scalar values compare equal so
/// sorting stays stable.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.lock().expect("store lock poisoned");
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        merge: bool,
    ) -> StoreResult<()> {
        let mut collections = self.collections.lock().expect("store lock poisoned");
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.get_mut(id) {
            Some(existing) if merge => deep_merge(existing, document),
            _ => {
                docs.insert(id.to_string(), document);
            }
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.lock().expect("store lock poisoned");
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        apply_field_updates(document, fields);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.collections.lock().expect("store lock poisoned");
        let mut results: Vec<Value> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| {
                        filters
                            .iter()
                            .all(|filter| get_path(doc, &filter.field) == Some(&filter.value))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            results.sort_by(|a, b| {
                let left = get_path(a, &order.field).unwrap_or(&Value::Null);
                let right = get_path(b, &order.field).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field_path: &str,
        value: Value,
    ) -> StoreResult<()> {
        let mut collections = self.collections.lock().expect("store lock poisoned");
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        let array = match get_path(document, field_path) {
            Some(Value::Array(existing)) => {
                let mut items = existing.clone();
                if !items.contains(&value) {
                    items.push(value);
                }
                items
            }
            _ => vec![value],
        };

        set_path(document, field_path, Value::Array(array));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("profiles", "u1", json!({ "totalPoints": 10 }), false)
            .await
            .unwrap();

        let doc = store.get("profiles", "u1").await.unwrap();
        assert_eq!(doc, Some(json!({ "totalPoints": 10 })));
        assert_eq!(store.get("profiles", "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_with_merge_preserves_existing_fields() {
        let store = MemoryStore::new();
        store
            .set("profiles", "u1", json!({ "a": 1, "stats": { "x": 1 } }), false)
            .await
            .unwrap();
        store
            .set("profiles", "u1", json!({ "stats": { "y": 2 } }), true)
            .await
            .unwrap();

        let doc = store.get("profiles", "u1").await.unwrap().unwrap();
        assert_eq!(doc, json!({ "a": 1, "stats": { "x": 1, "y": 2 } }));
    }

    #[tokio::test]
    async fn test_update_fields_requires_existing_document() {
        let store = MemoryStore::new();
        let mut fields = Map::new();
        fields.insert("level".to_string(), json!(2));

        let err = store
            .update_fields("profiles", "missing", fields.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound { .. }));

        store
            .set("profiles", "u1", json!({ "level": 1 }), false)
            .await
            .unwrap();
        store.update_fields("profiles", "u1", fields).await.unwrap();
        let doc = store.get("profiles", "u1").await.unwrap().unwrap();
        assert_eq!(doc["level"], json!(2));
    }

    #[tokio::test]
    async fn test_update_fields_with_dotted_path() {
        let store = MemoryStore::new();
        store
            .set("progress", "u1", json!({ "moduleProgress": {} }), false)
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert(
            "moduleProgress.basic-fact-checking".to_string(),
            json!({ "score": 30 }),
        );
        store.update_fields("progress", "u1", fields).await.unwrap();

        let doc = store.get("progress", "u1").await.unwrap().unwrap();
        assert_eq!(
            doc["moduleProgress"]["basic-fact-checking"],
            json!({ "score": 30 })
        );
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (id, user, points) in [("a", "u1", 10), ("b", "u2", 30), ("c", "u1", 20)] {
            store
                .set(
                    "scores",
                    id,
                    json!({ "userId": user, "points": points }),
                    false,
                )
                .await
                .unwrap();
        }

        let results = store
            .query(
                "scores",
                &[Filter::eq("userId", "u1")],
                Some(&OrderBy::desc("points")),
                None,
            )
            .await
            .unwrap();
        let points: Vec<i64> = results
            .iter()
            .map(|doc| doc["points"].as_i64().unwrap())
            .collect();
        assert_eq!(points, vec![20, 10]);

        let limited = store
            .query("scores", &[], Some(&OrderBy::desc("points")), Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0]["points"], json!(30));
    }

    #[tokio::test]
    async fn test_append_to_array_has_set_semantics() {
        let store = MemoryStore::new();
        store
            .set("progress", "u1", json!({ "achievements": [] }), false)
            .await
            .unwrap();

        store
            .append_to_array("progress", "u1", "achievements", json!("first-module"))
            .await
            .unwrap();
        store
            .append_to_array("progress", "u1", "achievements", json!("first-module"))
            .await
            .unwrap();
        store
            .append_to_array("progress", "u1", "achievements", json!("level-up"))
            .await
            .unwrap();

        let doc = store.get("progress", "u1").await.unwrap().unwrap();
        assert_eq!(doc["achievements"], json!(["first-module", "level-up"]));
    }

    #[tokio::test]
    async fn test_append_to_array_creates_missing_field() {
        let store = MemoryStore::new();
        store.set("progress", "u1", json!({}), false).await.unwrap();
        store
            .append_to_array("progress", "u1", "completedModules", json!("m1"))
            .await
            .unwrap();

        let doc = store.get("progress", "u1").await.unwrap().unwrap();
        assert_eq!(doc["completedModules"], json!(["m1"]));
    }
}
