//! In-memory warehouse that records every call. Test-only.

use crate::error::{WarehouseError, WarehouseResult};
use crate::warehouse::client::WarehouseClient;
use crate::warehouse::types::{CollectionPath, CreateMode, DropOptions, ObjectPayload, RemoteObject};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create {
        collection: String,
        payload: ObjectPayload,
        mode: CreateMode,
    },
    List {
        collection: String,
        like: Option<String>,
    },
    Fetch {
        collection: String,
        name: String,
    },
    Drop {
        collection: String,
        name: String,
        options: DropOptions,
    },
    Execute(String),
}

#[derive(Default)]
struct Store {
    objects: BTreeMap<String, BTreeMap<String, (RemoteObject, Value)>>,
    calls: Vec<Call>,
    next_failure: Option<WarehouseError>,
}

#[derive(Default)]
pub struct MemoryWarehouse {
    store: Mutex<Store>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object under the collection rendered as e.g. `databases[SALES].schemas`.
    pub fn seed(&self, collection: &str, object: RemoteObject) {
        let attributes = serde_json::to_value(&object).unwrap_or(Value::Null);
        self.store
            .lock()
            .objects
            .entry(collection.to_string())
            .or_default()
            .insert(object.name.clone(), (object, attributes));
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: WarehouseError) {
        self.store.lock().next_failure = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.lock().calls.clone()
    }

    pub fn contains(&self, collection: &str, name: &str) -> bool {
        self.store
            .lock()
            .objects
            .get(collection)
            .is_some_and(|items| items.contains_key(name))
    }

    fn record(&self, call: Call) -> WarehouseResult<()> {
        let mut store = self.store.lock();
        store.calls.push(call);
        match store.next_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// SQL `LIKE` matching, case-insensitive.
fn like_matches(pattern: &str, value: &str) -> bool {
    fn matches(p: &[char], v: &[char]) -> bool {
        match p.split_first() {
            None => v.is_empty(),
            Some(('%', rest)) => (0..=v.len()).any(|i| matches(rest, &v[i..])),
            Some(('_', rest)) => !v.is_empty() && matches(rest, &v[1..]),
            Some((c, rest)) => v.first().is_some_and(|x| x == c) && matches(rest, &v[1..]),
        }
    }
    let p: Vec<char> = pattern.to_uppercase().chars().collect();
    let v: Vec<char> = value.to_uppercase().chars().collect();
    matches(&p, &v)
}

#[async_trait]
impl WarehouseClient for MemoryWarehouse {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        payload: &ObjectPayload,
        mode: CreateMode,
    ) -> WarehouseResult<()> {
        let key = collection.to_string();
        self.record(Call::Create {
            collection: key.clone(),
            payload: payload.clone(),
            mode,
        })?;

        let name = payload.name().unwrap_or_default().to_string();
        let mut store = self.store.lock();
        let items = store.objects.entry(key).or_default();
        if items.contains_key(&name) {
            match mode {
                CreateMode::ErrorIfExists => {
                    return Err(WarehouseError::Api {
                        status: 409,
                        code: Some("002002".into()),
                        message: format!("SQL compilation error: Object '{}' already exists.", name),
                    });
                }
                CreateMode::IfNotExists => return Ok(()),
                CreateMode::OrReplace => {}
            }
        }

        let object = RemoteObject {
            name: name.clone(),
            comment: payload.get("comment").and_then(Value::as_str).map(str::to_string),
            created_on: Some(Utc::now()),
            owner: Some("SYSADMIN".into()),
            kind: payload.get("kind").and_then(Value::as_str).map(str::to_string),
            transient: None,
        };
        items.insert(name, (object, Value::Object(payload.as_map().clone())));
        Ok(())
    }

    fn iter<'a>(
        &'a self,
        collection: &'a CollectionPath,
        like: Option<&'a str>,
    ) -> BoxStream<'a, WarehouseResult<RemoteObject>> {
        let key = collection.to_string();
        let recorded = self.record(Call::List {
            collection: key.clone(),
            like: like.map(str::to_string),
        });
        let items: Vec<WarehouseResult<RemoteObject>> = match recorded {
            Err(e) => vec![Err(e)],
            Ok(()) => self
                .store
                .lock()
                .objects
                .get(&key)
                .map(|items| {
                    items
                        .values()
                        .filter(|(object, _)| like.is_none_or(|p| like_matches(p, &object.name)))
                        .map(|(object, _)| Ok(object.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        };
        stream::iter(items).boxed()
    }

    async fn fetch(&self, collection: &CollectionPath, name: &str) -> WarehouseResult<Value> {
        let key = collection.to_string();
        self.record(Call::Fetch {
            collection: key.clone(),
            name: name.to_string(),
        })?;
        self.store
            .lock()
            .objects
            .get(&key)
            .and_then(|items| items.get(name))
            .map(|(_, attributes)| attributes.clone())
            .ok_or_else(|| WarehouseError::NotFound(format!("Object '{}' does not exist", name)))
    }

    async fn drop_object(
        &self,
        collection: &CollectionPath,
        name: &str,
        options: DropOptions,
    ) -> WarehouseResult<()> {
        let key = collection.to_string();
        self.record(Call::Drop {
            collection: key.clone(),
            name: name.to_string(),
            options,
        })?;
        let removed = self
            .store
            .lock()
            .objects
            .get_mut(&key)
            .and_then(|items| items.remove(name));
        match removed {
            Some(_) => Ok(()),
            None if options.if_exists => Ok(()),
            None => Err(WarehouseError::NotFound(format!(
                "Object '{}' does not exist or not authorized.",
                name
            ))),
        }
    }

    async fn execute(&self, statement: &str) -> WarehouseResult<()> {
        self.record(Call::Execute(statement.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_matches() {
        assert!(like_matches("SALES%", "sales_2024"));
        assert!(like_matches("%_RAW", "EVENTS_RAW"));
        assert!(like_matches("A_C", "ABC"));
        assert!(!like_matches("A_C", "ABBC"));
        assert!(!like_matches("SALES%", "MARKETING"));
    }
}
