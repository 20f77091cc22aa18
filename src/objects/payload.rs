//! Pure transforms from validated parameters to creation payloads.

use crate::registry::ObjectTypeDescriptor;
use crate::warehouse::{CreateMode, ObjectPayload};
use serde_json::{Map, Value};

/// Warehouse flags the API expects as lowercase text.
const WAREHOUSE_TEXT_FLAGS: &[&str] = &["auto_resume", "initially_suspended", "enable_query_acceleration"];

/// Parameters consumed by payload construction rather than forwarded.
const CONTROL_PARAMS: &[&str] = &["replace_if_exists", "transient"];

/// `replace_if_exists` selects replace; otherwise an existing object is kept.
pub fn create_mode(params: &Map<String, Value>) -> CreateMode {
    match params.get("replace_if_exists").and_then(Value::as_bool) {
        Some(true) => CreateMode::OrReplace,
        _ => CreateMode::IfNotExists,
    }
}

/// Builds the payload for a flat (non-composite) object type.
pub fn flat_payload(
    descriptor: &ObjectTypeDescriptor,
    name: &str,
    params: &Map<String, Value>,
) -> ObjectPayload {
    let payload = ObjectPayload::named(name);
    let payload = apply_transient(descriptor, payload, params.get("transient"));

    params
        .iter()
        .filter(|(key, value)| !value.is_null() && !CONTROL_PARAMS.contains(&key.as_str()))
        .fold(payload, |payload, (key, value)| {
            let value = match value {
                Value::Bool(flag)
                    if descriptor.object_type == "warehouse"
                        && WAREHOUSE_TEXT_FLAGS.contains(&key.as_str()) =>
                {
                    Value::String(flag.to_string())
                }
                other => other.clone(),
            };
            payload.with(key.as_str(), value)
        })
}

/// Database and schema encode `transient` as `kind`; other types keep the flag
/// only when set.
fn apply_transient(
    descriptor: &ObjectTypeDescriptor,
    payload: ObjectPayload,
    transient: Option<&Value>,
) -> ObjectPayload {
    let Some(transient) = transient.and_then(Value::as_bool) else {
        return payload;
    };
    match (descriptor.uses_kind(), transient) {
        (true, true) => payload.with("kind", "TRANSIENT"),
        (true, false) => payload.with("kind", "PERMANENT"),
        (false, true) => payload.with("transient", true),
        (false, false) => payload,
    }
}
