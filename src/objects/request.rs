//! Per-call request and result values.

use crate::error::{ObjectError, ObjectResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Named ancestor identifiers (`database`, `schema`) for nested objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentContext {
    values: BTreeMap<String, String>,
}

impl ParentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(param, value);
        self
    }

    pub fn insert(&mut self, param: impl Into<String>, value: impl Into<String>) {
        self.values.insert(param.into(), value.into());
    }

    pub fn get(&self, param: &str) -> Option<&str> {
        self.values.get(param).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parent values as JSON attributes, for echoing in results.
    pub fn to_attributes(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    pub parents: ParentContext,
    /// Validated parameters, restricted to the type's allowed parameters.
    pub params: Map<String, Value>,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: ParentContext::new(),
            params: Map::new(),
        }
    }

    pub fn parents(mut self, parents: ParentContext) -> Self {
        self.parents = parents;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub like: Option<String>,
    pub starts_with: Option<String>,
    pub limit: i64,
    pub parents: ParentContext,
}

impl ListRequest {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 10_000;

    /// Checks the filter combination and limit, returning the single LIKE
    /// pattern to pass on.
    pub fn pattern(&self, tool: &'static str) -> ObjectResult<Option<String>> {
        let like = self.like.as_deref().filter(|s| !s.is_empty());
        let starts_with = self.starts_with.as_deref().filter(|s| !s.is_empty());
        if like.is_some() && starts_with.is_some() {
            return Err(ObjectError::invalid_argument(
                tool,
                "Cannot use both 'like' and 'starts_with' parameters",
            ));
        }
        if !(1..=Self::MAX_LIMIT).contains(&self.limit) {
            return Err(ObjectError::invalid_argument(
                tool,
                format!("Limit must be between 1 and {}", Self::MAX_LIMIT),
            ));
        }
        Ok(like
            .map(str::to_string)
            .or_else(|| starts_with.map(|prefix| format!("{}%", prefix))))
    }
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            like: None,
            starts_with: None,
            limit: Self::DEFAULT_LIMIT,
            parents: ParentContext::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DropRequest {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
    pub parents: ParentContext,
}

impl DropRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_exists: true,
            cascade: false,
            parents: ParentContext::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescribeRequest {
    pub name: String,
    pub parents: ParentContext,
}

/// Successful create or drop.
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub object_type: &'static str,
    pub name: String,
    pub message: String,
    /// Echoed attributes of the created object.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl OperationOutcome {
    pub fn new(object_type: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            object_type,
            name: name.into(),
            message: message.into(),
            attributes: Map::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub object_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transient: Option<bool>,
}

/// Full attribute map of one object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectDetails {
    pub object_type: &'static str,
    pub name: String,
    pub attributes: Value,
}
