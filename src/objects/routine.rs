//! Argument, return-type and language handling shared by functions and procedures.

use crate::error::{ObjectError, ObjectResult};
use crate::objects::datatype;
use crate::objects::request::CreateRequest;
use crate::registry::ValidationRules;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub datatype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl RoutineArgument {
    pub fn to_payload(&self) -> Value {
        json!({ "name": self.name, "datatype": self.datatype })
    }
}

/// Validated pieces of a function or procedure definition.
#[derive(Debug, Clone)]
pub struct RoutineDefinition {
    pub arguments: Vec<RoutineArgument>,
    /// Return type as given by the caller.
    pub returns: String,
    /// Return type after synonym mapping.
    pub return_type: String,
    pub language: String,
    pub body: String,
    pub comment: Option<String>,
}

impl RoutineDefinition {
    pub fn from_request(
        object_type: &'static str,
        request: &CreateRequest,
        rules: &ValidationRules,
    ) -> ObjectResult<Self> {
        let invalid = |message: String| ObjectError::invalid_argument(object_type, message);

        let returns = required(request, "returns", object_type)?;
        let body = required(request, "body", object_type)?;

        let language = request
            .str_param("language")
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("SQL")
            .to_uppercase();

        let arguments = parse_arguments(request.params.get("arguments"), rules.argument_modes)
            .map_err(invalid)?;

        Ok(Self {
            arguments,
            return_type: datatype::normalize(&returns),
            returns,
            language,
            body,
            comment: request.str_param("comment").map(str::to_string),
        })
    }

    pub fn arguments_payload(&self) -> Vec<Value> {
        self.arguments.iter().map(RoutineArgument::to_payload).collect()
    }
}

fn required(request: &CreateRequest, key: &str, object_type: &'static str) -> ObjectResult<String> {
    request
        .str_param(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ObjectError::invalid_argument(object_type, format!("'{}' is required for creating {}", key, object_type))
        })
}

/// Reads the `arguments` array. `mode` is only accepted when `modes` is non-empty.
pub fn parse_arguments(value: Option<&Value>, modes: &[&str]) -> Result<Vec<RoutineArgument>, String> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err("'arguments' must be a JSON array".into()),
    };

    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(Value::as_str).map(str::trim).unwrap_or_default();
            let datatype = entry.get("type").and_then(Value::as_str).map(str::trim).unwrap_or_default();
            if name.is_empty() || datatype.is_empty() {
                return Err(format!("Argument must have 'name' and 'type': {}", entry));
            }

            let mode = match entry.get("mode").and_then(Value::as_str) {
                None => None,
                Some(_) if modes.is_empty() => None,
                Some(mode) => {
                    let mode = mode.trim().to_uppercase();
                    if !modes.contains(&mode.as_str()) {
                        return Err(format!(
                            "Invalid argument mode '{}'. Must be one of: {}",
                            mode,
                            modes.join(", ")
                        ));
                    }
                    Some(mode)
                }
            };

            Ok(RoutineArgument {
                name: name.to_string(),
                datatype: datatype::normalize(datatype),
                mode,
            })
        })
        .collect()
}
