//! Human-readable tool descriptions and server instructions.

use crate::warehouse::ConnectionMetadata;

pub const CREATE_OBJECT: &str = "create_object";
pub const LIST_OBJECTS: &str = "list_objects";
pub const DROP_OBJECT: &str = "drop_object";
pub const DESCRIBE_OBJECT: &str = "describe_object";

/// Every tool this server registers, in the order they are introduced to clients.
pub const TOOL_NAMES: &[&str] = &[CREATE_OBJECT, LIST_OBJECTS, DESCRIBE_OBJECT, DROP_OBJECT];

pub fn create_object(object_types: &[&str]) -> String {
    format!(
        "Create any type of Snowflake object. \
        Supported types: {}. \
        Specify the object_type parameter to choose what to create. \
        Nested objects need their parents: 'database' for schemas and database roles, \
        'database' and 'schema' for tables, views, functions and procedures. \
        Composite parameters (columns, arguments, clustering_keys) may be passed as JSON arrays \
        or as JSON-encoded strings.",
        object_types.join(", ")
    )
}

pub fn list_objects(object_types: &[&str]) -> String {
    format!(
        "List any type of Snowflake objects with optional filtering. \
        Supported types: {}. \
        Specify the object_type parameter to choose what to list. \
        Use either 'like' (SQL LIKE pattern) or 'starts_with', not both.",
        object_types.join(", ")
    )
}

pub fn describe_object(object_types: &[&str]) -> String {
    format!(
        "Describe a single Snowflake object and return all of its attributes. \
        Supported types: {}.",
        object_types.join(", ")
    )
}

pub fn drop_object(object_types: &[&str]) -> String {
    format!(
        "Drop any type of Snowflake object. \
        Supported types: {}. \
        Specify the object_type parameter to choose what to drop. \
        System databases and built-in roles can never be dropped.",
        object_types.join(", ")
    )
}

/// Instructions returned from `initialize`.
pub fn server_instructions(metadata: &ConnectionMetadata, configured: bool) -> String {
    let tools = TOOL_NAMES.join(", ");
    if metadata.connected {
        format!(
            "Snowflake object server connected to {} as role {}. Available tools: {}.",
            metadata.host.as_deref().unwrap_or("unknown"),
            metadata.role.as_deref().unwrap_or("default"),
            tools
        )
    } else if configured {
        format!(
            "Snowflake object server for account {}. The connection is opened on the first tool call. \
            Available tools: {}.",
            metadata.account.as_deref().unwrap_or("unknown"),
            tools
        )
    } else {
        format!(
            "Snowflake object server (not configured). \
            Set SNOWFLAKE_ACCOUNT (or SNOWFLAKE_HOST) and SNOWFLAKE_TOKEN before using the tools. \
            Available tools: {}.",
            tools
        )
    }
}
