//! `create_object`: validates flat arguments and routes them to the type's manager.

use crate::error::{ObjectError, ObjectResult, Result};
use crate::objects::{CreateRequest, ManagerCache, OperationOutcome};
use crate::protocol::{CallToolResult, Tool};
use crate::registry::{self, ObjectTypeDescriptor};
use crate::tools::args;
use crate::tools::descriptions::{self, CREATE_OBJECT};
use crate::tools::registry::{ToolHandler, object_result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Parameters that may arrive as JSON-encoded text instead of arrays.
const JSON_ARRAY_PARAMS: &[&str] = &["columns", "arguments", "clustering_keys"];

/// Flags that must arrive as JSON booleans.
const BOOLEAN_PARAMS: &[&str] = &[
    "transient",
    "replace_if_exists",
    "secure",
    "auto_resume",
    "initially_suspended",
    "enable_query_acceleration",
];

#[derive(Debug, Deserialize)]
pub struct CreateObjectArgs {
    pub object_type: String,
    pub name: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    /// Everything else; filtered down to the type's allowed parameters.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

pub struct CreateObjectTool {
    managers: Arc<ManagerCache>,
}

impl CreateObjectTool {
    pub fn new(managers: Arc<ManagerCache>) -> Self {
        Self { managers }
    }

    async fn create(&self, arguments: Value) -> ObjectResult<OperationOutcome> {
        let args: CreateObjectArgs = args::parse(CREATE_OBJECT, arguments)?;
        let manager = self
            .managers
            .get(&args.object_type)
            .map_err(|e| e.with_tool(CREATE_OBJECT))?;
        let descriptor = manager.descriptor();

        args::require_name(CREATE_OBJECT, descriptor, &args.name, "creating")?;
        let parents = args::required_parents(
            CREATE_OBJECT,
            descriptor,
            args.database.as_deref(),
            args.schema.as_deref(),
            &format!("creating {}", descriptor.object_type),
        )?;
        let params = forwarded_params(descriptor, args.params)
            .map_err(|message| ObjectError::invalid_argument(CREATE_OBJECT, message))?;

        info!(
            "Creating {}: {} with params: {:?}",
            descriptor.object_type,
            args.name,
            params.keys().collect::<Vec<_>>()
        );

        let request = CreateRequest {
            name: args.name.trim().to_string(),
            parents,
            params,
        };
        manager
            .create(request)
            .await
            .map_err(|e| e.with_tool(CREATE_OBJECT))
    }
}

/// Restricts `params` to what the type accepts, decodes JSON-encoded
/// composites and applies the type's numeric and enum rules.
pub fn forwarded_params(
    descriptor: &ObjectTypeDescriptor,
    params: Map<String, Value>,
) -> std::result::Result<Map<String, Value>, String> {
    let allowed: Map<String, Value> = params
        .into_iter()
        .filter(|(key, value)| {
            let keep = descriptor.allows(key) && !value.is_null();
            if !keep && !value.is_null() {
                debug!("Ignoring parameter '{}' for {}", key, descriptor.object_type);
            }
            keep
        })
        .collect();

    let decoded = decode_json_arrays(allowed)?;
    validate(descriptor, decoded)
}

fn decode_json_arrays(params: Map<String, Value>) -> std::result::Result<Map<String, Value>, String> {
    params
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) if JSON_ARRAY_PARAMS.contains(&key.as_str()) => {
                match serde_json::from_str::<Value>(&text) {
                    Ok(decoded @ Value::Array(_)) => Ok((key, decoded)),
                    _ => Err(format!("'{}' must be a valid JSON array", key)),
                }
            }
            other => Ok((key, other)),
        })
        .collect()
}

fn integer(params: &Map<String, Value>, key: &str) -> std::result::Result<Option<i64>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("'{}' must be an integer", key)),
    }
}

fn boolean(params: &Map<String, Value>, key: &str) -> std::result::Result<Option<bool>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| format!("'{}' must be a boolean", key)),
    }
}

fn validate(
    descriptor: &ObjectTypeDescriptor,
    mut params: Map<String, Value>,
) -> std::result::Result<Map<String, Value>, String> {
    let rules = &descriptor.validation;
    let object_type = descriptor.object_type;

    for key in BOOLEAN_PARAMS {
        boolean(&params, key)?;
    }

    if rules.max_transient_retention_days.is_some() || rules.max_permanent_retention_days.is_some() {
        if let Some(days) = integer(&params, "data_retention_time_in_days")? {
            if days < 0 {
                return Err("data_retention_time_in_days must not be negative".into());
            }
            let transient = boolean(&params, "transient")?.unwrap_or(false);
            if transient {
                if let Some(max) = rules.max_transient_retention_days
                    && days > max
                {
                    return Err(format!("Transient {}s can have maximum {} day retention", object_type, max));
                }
            } else if let Some(max) = rules.max_permanent_retention_days
                && days > max
            {
                return Err(format!("Permanent {}s can have maximum {} days retention", object_type, max));
            }
        }
    }

    for (key, allowed, label) in [
        ("warehouse_size", rules.warehouse_sizes, "warehouse size"),
        ("warehouse_type", rules.warehouse_types, "warehouse type"),
        ("scaling_policy", rules.scaling_policies, "scaling policy"),
    ] {
        if allowed.is_empty() {
            continue;
        }
        let Some(value) = params.get(key) else {
            continue;
        };
        let Some(text) = value.as_str() else {
            return Err(format!("'{}' must be a string", key));
        };
        let upper = text.trim().to_uppercase();
        if upper.is_empty() {
            params.remove(key);
            continue;
        }
        if !allowed.contains(&upper.as_str()) {
            return Err(format!("Invalid {}. Must be one of: {}", label, allowed.join(", ")));
        }
        params.insert(key.to_string(), Value::String(upper));
    }

    if let Some((min, max)) = rules.auto_suspend_range
        && let Some(seconds) = integer(&params, "auto_suspend")?
        && !(min..=max).contains(&seconds)
    {
        return Err(format!("auto_suspend must be between {} and {} seconds", min, max));
    }

    if let Some((lo, hi)) = rules.cluster_count_range {
        let min_count = integer(&params, "min_cluster_count")?;
        let max_count = integer(&params, "max_cluster_count")?;
        for (key, count) in [("min_cluster_count", min_count), ("max_cluster_count", max_count)] {
            if let Some(count) = count
                && !(lo..=hi).contains(&count)
            {
                return Err(format!("{} must be between {} and {}", key, lo, hi));
            }
        }
        if let (Some(min_count), Some(max_count)) = (min_count, max_count)
            && min_count > max_count
        {
            return Err("min_cluster_count cannot exceed max_cluster_count".into());
        }
    }

    Ok(params)
}

#[async_trait]
impl ToolHandler for CreateObjectTool {
    fn definition(&self) -> Tool {
        let object_types = registry::object_types();
        crate::define_tool! {
            name: CREATE_OBJECT,
            description: descriptions::create_object(&object_types),
            schema: {
                "type": "object",
                "properties": {
                    "object_type": {
                        "type": "string",
                        "enum": object_types,
                        "description": "Type of object to create"
                    },
                    "name": {
                        "type": "string",
                        "description": "Name of the object"
                    },
                    "database": {
                        "type": "string",
                        "description": "Database name (required for schemas, database roles and schema objects)"
                    },
                    "schema": {
                        "type": "string",
                        "description": "Schema name (required for tables, views, functions and procedures)"
                    },
                    "comment": { "type": "string", "description": "Object comment" },
                    "transient": {
                        "type": "boolean",
                        "description": "Create a transient database or schema"
                    },
                    "data_retention_time_in_days": {
                        "type": "integer",
                        "description": "Time Travel retention (0-1 days for transient objects, 0-90 otherwise)"
                    },
                    "replace_if_exists": {
                        "type": "boolean",
                        "description": "Replace an existing object instead of keeping it"
                    },
                    "warehouse_size": { "type": "string", "description": "XSMALL through 6XLARGE" },
                    "warehouse_type": { "type": "string", "description": "STANDARD or SNOWPARK-OPTIMIZED" },
                    "auto_suspend": {
                        "type": "integer",
                        "description": "Seconds of inactivity before suspending (60-3600)"
                    },
                    "auto_resume": { "type": "boolean" },
                    "initially_suspended": { "type": "boolean" },
                    "enable_query_acceleration": { "type": "boolean" },
                    "query_acceleration_max_scale_factor": { "type": "integer" },
                    "max_cluster_count": { "type": "integer", "minimum": 1, "maximum": 10 },
                    "min_cluster_count": { "type": "integer", "minimum": 1, "maximum": 10 },
                    "scaling_policy": { "type": "string", "description": "STANDARD or ECONOMY" },
                    "columns": {
                        "type": ["array", "string"],
                        "description": "Table columns: [{\"name\": ..., \"type\": ..., \"nullable\": true}]"
                    },
                    "clustering_keys": {
                        "type": ["array", "string"],
                        "description": "Table clustering keys"
                    },
                    "sql_text": {
                        "type": "string",
                        "description": "SELECT statement defining a view"
                    },
                    "secure": { "type": "boolean", "description": "Create a secure view" },
                    "arguments": {
                        "type": ["array", "string"],
                        "description": "Function or procedure arguments: [{\"name\": ..., \"type\": ..., \"mode\": \"IN\"}]"
                    },
                    "returns": { "type": "string", "description": "Return type" },
                    "language": {
                        "type": "string",
                        "description": "SQL, JAVASCRIPT, PYTHON, JAVA or SCALA (default SQL)"
                    },
                    "body": { "type": "string", "description": "Function or procedure body" }
                },
                "required": ["object_type", "name"]
            }
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "create_object"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        Ok(object_result(self.create(arguments).await))
    }
}
