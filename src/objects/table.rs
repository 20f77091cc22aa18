//! Table creation with column definitions.

use crate::error::{ObjectError, ObjectResult};
use crate::objects::manager::ObjectManager;
use crate::objects::request::{CreateRequest, OperationOutcome};
use crate::warehouse::{CreateMode, ObjectPayload};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub datatype: String,
    pub nullable: bool,
}

impl ColumnDefinition {
    fn to_payload(&self) -> Value {
        json!({
            "name": self.name,
            "datatype": self.datatype,
            "nullable": self.nullable,
        })
    }
}

/// Reads the `columns` array. Each entry needs a name and a type; nullable defaults to true.
pub fn parse_columns(value: Option<&Value>, min_columns: usize) -> Result<Vec<ColumnDefinition>, String> {
    let entries = match value {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => return Err("'columns' must be a JSON array".into()),
    };
    if entries.len() < min_columns {
        return Err(format!(
            "At least {} column{} must be specified",
            spell(min_columns),
            if min_columns == 1 { "" } else { "s" }
        ));
    }

    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(Value::as_str).map(str::trim).unwrap_or_default();
            let datatype = entry.get("type").and_then(Value::as_str).map(str::trim).unwrap_or_default();
            if name.is_empty() || datatype.is_empty() {
                return Err(format!("Column must have 'name' and 'type': {}", entry));
            }
            let nullable = match entry.get("nullable") {
                None | Some(Value::Null) => true,
                Some(Value::Bool(b)) => *b,
                Some(other) => return Err(format!("Column 'nullable' must be a boolean: {}", other)),
            };
            Ok(ColumnDefinition {
                name: name.to_string(),
                datatype: datatype.to_string(),
                nullable,
            })
        })
        .collect()
}

fn spell(n: usize) -> String {
    match n {
        1 => "one".into(),
        n => n.to_string(),
    }
}

fn parse_clustering_keys(value: Option<&Value>) -> Result<Option<Vec<String>>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(keys)) => keys
            .iter()
            .map(|key| match key.as_str().map(str::trim) {
                Some(key) if !key.is_empty() => Ok(key.to_string()),
                _ => Err(format!("Clustering key must be a non-empty string: {}", key)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|keys| Some(keys).filter(|k| !k.is_empty())),
        Some(_) => Err("'clustering_keys' must be a JSON array".into()),
    }
}

pub(crate) async fn create(manager: &ObjectManager, request: &CreateRequest) -> ObjectResult<OperationOutcome> {
    let object_type = manager.object_type();
    let min_columns = manager.descriptor().validation.min_columns.unwrap_or(1);
    let columns = parse_columns(request.params.get("columns"), min_columns)
        .map_err(|message| ObjectError::invalid_argument(object_type, message))?;
    let clustering_keys = parse_clustering_keys(request.params.get("clustering_keys"))
        .map_err(|message| ObjectError::invalid_argument(object_type, message))?;
    let comment = request.str_param("comment");

    let collection = manager.collection(&request.parents)?;
    let client = manager.client()?;

    let payload = ObjectPayload::named(&request.name)
        .with(
            "columns",
            columns.iter().map(ColumnDefinition::to_payload).collect::<Vec<_>>(),
        )
        .with_opt("comment", comment)
        .with_opt("cluster_by", clustering_keys.clone());

    client
        .create(&collection, &payload, CreateMode::ErrorIfExists)
        .await
        .map_err(|e| manager.failure("create", &request.name, &e))?;

    Ok(manager
        .created(&request.name)
        .attributes(request.parents.to_attributes())
        .attribute("columns", json!(columns))
        .attribute("comment", comment)
        .attribute("clustering_keys", json!(clustering_keys)))
}
