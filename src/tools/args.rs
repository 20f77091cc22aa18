//! Argument handling shared by the object tools.

use crate::error::{ErrorKind, ObjectError, ObjectResult};
use crate::objects::ParentContext;
use crate::registry::ObjectTypeDescriptor;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes tool arguments, reporting failures in the tool error shape.
pub(crate) fn parse<T: DeserializeOwned>(tool: &'static str, arguments: Value) -> ObjectResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ObjectError::invalid_argument(tool, format!("Invalid arguments: {}", e)))
}

/// Non-blank, trimmed value.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn require_name(
    tool: &'static str,
    descriptor: &ObjectTypeDescriptor,
    name: &str,
    action: &str,
) -> ObjectResult<()> {
    if present(Some(name)).is_none() {
        return Err(ObjectError::invalid_argument(
            tool,
            format!("'name' is required for {} {}", action, descriptor.object_type),
        ));
    }
    Ok(())
}

/// Collects parent identifiers from the flat `database`/`schema` arguments.
///
/// Returns the first required parent that was not supplied alongside the
/// context built from whatever was. A supplied `schema` is kept even when the
/// type does not need one.
pub(crate) fn parent_context(
    descriptor: &ObjectTypeDescriptor,
    database: Option<&str>,
    schema: Option<&str>,
) -> (ParentContext, Option<&'static str>) {
    let lookup = |param: &str| match param {
        "database" => present(database),
        "schema" => present(schema),
        _ => None,
    };

    let mut parents = ParentContext::new();
    let mut missing = None;
    for &param in descriptor.parent_params {
        match lookup(param) {
            Some(value) => parents.insert(param, value),
            None => {
                missing.get_or_insert(param);
            }
        }
    }

    if let Some(schema) = present(schema)
        && !descriptor.parent_params.contains(&"schema")
    {
        parents.insert("schema", schema);
    }

    (parents, missing)
}

/// Like [`parent_context`], but every declared parent must be present.
///
/// `purpose` completes the message, e.g. `creating table`.
pub(crate) fn required_parents(
    tool: &'static str,
    descriptor: &ObjectTypeDescriptor,
    database: Option<&str>,
    schema: Option<&str>,
    purpose: &str,
) -> ObjectResult<ParentContext> {
    match parent_context(descriptor, database, schema) {
        (parents, None) => Ok(parents),
        (_, Some(param)) => Err(ObjectError::new(
            tool,
            ErrorKind::MissingParentParameter,
            format!("'{}' is required for {}", param, purpose),
        )),
    }
}
