//! Values exchanged with the warehouse client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One resolved step of a collection path, e.g. `databases[SALES]` or `schemas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub collection: String,
    pub item: Option<String>,
}

/// Resolved address of a collection, with every parent filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    segments: Vec<PathSegment>,
}

impl CollectionPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Name of the collection the path ends in (`tables`, `roles`, ...).
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(|s| s.collection.as_str())
    }

    /// Selected item of the given ancestor collection, if any.
    pub fn item_of(&self, collection: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.collection == collection)
            .and_then(|s| s.item.as_deref())
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.collection)?;
            if let Some(item) = &segment.item {
                write!(f, "[{}]", item)?;
            }
        }
        Ok(())
    }
}

/// Create-when-exists policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreateMode {
    #[default]
    ErrorIfExists,
    OrReplace,
    IfNotExists,
}

impl CreateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ErrorIfExists => "errorIfExists",
            Self::OrReplace => "orReplace",
            Self::IfNotExists => "ifNotExists",
        }
    }
}

/// Flags forwarded unchanged to the warehouse drop call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropOptions {
    pub if_exists: bool,
    pub cascade: bool,
}

/// Immutable creation payload sent to the warehouse.
///
/// Built by value: every `with_*` call returns a new payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ObjectPayload {
    fields: Map<String, Value>,
}

impl ObjectPayload {
    pub fn named(name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(name.into()));
        Self { fields }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Adds the field only when a value is present.
    pub fn with_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// An object as the warehouse reports it in listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteObject {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub transient: Option<bool>,
}

impl RemoteObject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.parse::<bool>().ok().or_else(|| match s.to_uppercase().as_str() {
            "Y" | "YES" => Some(true),
            "N" | "NO" => Some(false),
            _ => None,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_path_display() {
        let path = CollectionPath::new(vec![
            PathSegment {
                collection: "databases".into(),
                item: Some("SALES".into()),
            },
            PathSegment {
                collection: "schemas".into(),
                item: Some("PUBLIC".into()),
            },
            PathSegment {
                collection: "tables".into(),
                item: None,
            },
        ]);
        assert_eq!(path.to_string(), "databases[SALES].schemas[PUBLIC].tables");
        assert_eq!(path.leaf(), Some("tables"));
        assert_eq!(path.item_of("schemas"), Some("PUBLIC"));
        assert_eq!(path.item_of("tables"), None);
    }

    #[test]
    fn test_payload_is_built_by_value() {
        let base = ObjectPayload::named("WH");
        let extended = base.clone().with("auto_resume", "true").with_opt::<String>("comment", None);
        assert_eq!(base.keys().count(), 1);
        assert_eq!(extended.keys().collect::<Vec<_>>(), vec!["auto_resume", "name"]);
        assert_eq!(extended.name(), Some("WH"));
    }

    #[test]
    fn test_remote_object_lenient_fields() {
        let obj: RemoteObject = serde_json::from_value(serde_json::json!({
            "name": "SALES",
            "created_on": "2024-05-01T10:00:00.000-07:00",
            "kind": "TRANSIENT",
            "transient": "false",
            "unknown_field": 1
        }))
        .unwrap();
        assert_eq!(obj.name, "SALES");
        assert!(obj.created_on.is_some());
        assert_eq!(obj.transient, Some(false));

        let obj: RemoteObject =
            serde_json::from_value(serde_json::json!({"name": "X", "created_on": 12})).unwrap();
        assert!(obj.created_on.is_none());
    }

    #[test]
    fn test_create_mode_wire_names() {
        assert_eq!(CreateMode::OrReplace.as_str(), "orReplace");
        assert_eq!(CreateMode::IfNotExists.as_str(), "ifNotExists");
        assert_eq!(CreateMode::default(), CreateMode::ErrorIfExists);
    }
}
