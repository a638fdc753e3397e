//! JSON document utilities shared by store adapters.
//!
//! Documents are plain `serde_json` values. Before anything is written the
//! value passes through [`strip_empty`], which drops nulls and empty nested
//! objects so an unset optional field is entirely absent from storage rather
//! than present-as-null. Field updates address nested fields with dotted
//! paths (`"moduleProgress.basic-fact-checking"`), mirroring the update
//! semantics of managed document databases.

use serde_json::{Map, Value};

/// Recursively remove null entries and empty nested objects.
///
/// Arrays are kept as-is; only object fields are stripped. An object that
/// becomes empty after stripping is omitted from its parent entirely.
pub fn strip_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut cleaned = Map::new();
            for (key, entry) in map {
                match entry {
                    Value::Null => {}
                    Value::Object(_) => {
                        let nested = strip_empty(entry);
                        if nested.as_object().is_some_and(|m| !m.is_empty()) {
                            cleaned.insert(key, nested);
                        }
                    }
                    other => {
                        cleaned.insert(key, other);
                    }
                }
            }
            Value::Object(cleaned)
        }
        other => other,
    }
}

/// Read a (possibly dotted) field path out of a document.
pub fn get_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a (possibly dotted) field path inside a document, creating
/// intermediate objects as needed. Intermediate non-object values are
/// replaced.
pub fn set_path(document: &mut Value, path: &str, value: Value) {
    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    let Value::Object(map) = document else {
        return;
    };

    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(entry, rest, value);
        }
    }
}

/// Apply a set of dotted-path field updates to a document.
pub fn apply_field_updates(document: &mut Value, fields: Map<String, Value>) {
    for (path, value) in fields {
        set_path(document, &path, value);
    }
}

/// Deep-merge `incoming` object fields into `base` (set-with-merge
/// semantics). Non-object values and arrays replace wholesale.
pub fn deep_merge(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

/// Encode a timestamp the way document fields store it.
pub fn timestamp_value(datetime: &chrono::DateTime<chrono::Utc>) -> Value {
    Value::String(datetime.to_rfc3339())
}

/// Timestamp (de)serialization for document fields.
///
/// Serializes as RFC 3339 strings. Deserialization accepts RFC 3339 strings
/// or integer epoch milliseconds, so documents written by other clients
/// normalize to `DateTime<Utc>` at the store boundary; everything above the
/// store works with a single timestamp type.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Parse a JSON value into a UTC timestamp if possible.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(number) => {
                let millis = number.as_i64().or_else(|| number.as_f64().map(|f| f as i64))?;
                DateTime::from_timestamp_millis(millis)
            }
            _ => None,
        }
    }

    pub fn serialize<S>(datetime: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&datetime.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| DeError::custom("invalid timestamp value"))
    }
}

/// Like [`timestamp`], for optional fields. Absent and null both map to
/// `None`; `None` fields must be skipped on serialization so they never
/// reach storage as nulls.
pub mod timestamp_opt {
    use chrono::{DateTime, Utc};
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(
        datetime: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(None),
            other => super::timestamp::parse(&other)
                .map(Some)
                .ok_or_else(|| DeError::custom("invalid timestamp value")),
        }
    }
}
