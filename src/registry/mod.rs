//! Object-type registry.
//!
//! A static table describing every Snowflake object type the tools can manage:
//! where its collection lives, which creation parameters it accepts, which
//! parent identifiers address it, and how its parameters are validated. The
//! table is built once and exposed only through the accessors below.

pub mod descriptor;

pub use descriptor::{
    CollectionTemplate, CreateBuilder, ObjectTypeDescriptor, PathSegmentTemplate, ValidationRules,
};

use crate::error::{ErrorKind, ObjectError, ObjectResult};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Databases the platform owns. Never droppable.
pub const SYSTEM_DATABASES: &[&str] = &["SNOWFLAKE", "SNOWFLAKE_SAMPLE_DATA", "INFORMATION_SCHEMA"];

/// Account roles the platform owns. Never droppable.
pub const SYSTEM_ROLES: &[&str] = &["ACCOUNTADMIN", "SECURITYADMIN", "SYSADMIN", "PUBLIC"];

pub const WAREHOUSE_SIZES: &[&str] = &[
    "XSMALL", "SMALL", "MEDIUM", "LARGE", "XLARGE", "2XLARGE", "3XLARGE", "4XLARGE", "5XLARGE",
    "6XLARGE",
];

pub const WAREHOUSE_TYPES: &[&str] = &["STANDARD", "SNOWPARK-OPTIMIZED"];

pub const SCALING_POLICIES: &[&str] = &["STANDARD", "ECONOMY"];

pub const ARGUMENT_MODES: &[&str] = &["IN", "OUT", "INOUT"];

const DB_SCHEMA_PARAMS: &[&str] = &[
    "comment",
    "transient",
    "data_retention_time_in_days",
    "replace_if_exists",
];

const WAREHOUSE_PARAMS: &[&str] = &[
    "warehouse_size",
    "warehouse_type",
    "auto_suspend",
    "auto_resume",
    "initially_suspended",
    "comment",
    "enable_query_acceleration",
    "query_acceleration_max_scale_factor",
    "max_cluster_count",
    "min_cluster_count",
    "scaling_policy",
];

const ROUTINE_PARAMS: &[&str] = &["arguments", "returns", "language", "body", "comment"];

fn retention_rules(protected: &'static [&'static str]) -> ValidationRules {
    ValidationRules {
        max_transient_retention_days: Some(1),
        max_permanent_retention_days: Some(90),
        protected_names: protected,
        ..ValidationRules::default()
    }
}

fn build_registry() -> BTreeMap<&'static str, ObjectTypeDescriptor> {
    let descriptors = vec![
        ObjectTypeDescriptor::new("database", "databases", DB_SCHEMA_PARAMS)
            .validation(retention_rules(SYSTEM_DATABASES)),
        ObjectTypeDescriptor::new("schema", "databases[{database}].schemas", DB_SCHEMA_PARAMS)
            .parents(&["database"])
            .validation(retention_rules(&[])),
        ObjectTypeDescriptor::new("warehouse", "warehouses", WAREHOUSE_PARAMS).validation(
            ValidationRules {
                warehouse_sizes: WAREHOUSE_SIZES,
                warehouse_types: WAREHOUSE_TYPES,
                scaling_policies: SCALING_POLICIES,
                auto_suspend_range: Some((60, 3600)),
                cluster_count_range: Some((1, 10)),
                ..ValidationRules::default()
            },
        ),
        ObjectTypeDescriptor::new("role", "roles", &["comment"]).validation(ValidationRules {
            protected_names: SYSTEM_ROLES,
            ..ValidationRules::default()
        }),
        ObjectTypeDescriptor::new("database_role", "databases[{database}].database_roles", &["comment"])
            .parents(&["database"]),
        ObjectTypeDescriptor::new(
            "table",
            "databases[{database}].schemas[{schema}].tables",
            &["columns", "comment", "clustering_keys"],
        )
        .parents(&["database", "schema"])
        .builder(CreateBuilder::Table)
        .validation(ValidationRules {
            min_columns: Some(1),
            ..ValidationRules::default()
        }),
        ObjectTypeDescriptor::new(
            "view",
            "databases[{database}].schemas[{schema}].views",
            &["sql_text", "comment", "secure"],
        )
        .parents(&["database", "schema"])
        .builder(CreateBuilder::View)
        .validation(ValidationRules {
            sql_must_start_with: Some("SELECT"),
            ..ValidationRules::default()
        }),
        ObjectTypeDescriptor::new(
            "function",
            "databases[{database}].schemas[{schema}].functions",
            ROUTINE_PARAMS,
        )
        .parents(&["database", "schema"])
        .builder(CreateBuilder::Function),
        ObjectTypeDescriptor::new(
            "procedure",
            "databases[{database}].schemas[{schema}].procedures",
            ROUTINE_PARAMS,
        )
        .parents(&["database", "schema"])
        .builder(CreateBuilder::Procedure)
        .validation(ValidationRules {
            argument_modes: ARGUMENT_MODES,
            ..ValidationRules::default()
        }),
    ];

    let mut registry = BTreeMap::new();
    for descriptor in descriptors {
        // Placeholders in the path must name exactly the declared parents.
        if let Err(problem) = descriptor.check_parents() {
            panic!("invalid registry entry '{}': {}", descriptor.object_type, problem);
        }
        registry.insert(descriptor.object_type, descriptor);
    }
    registry
}

static REGISTRY: Lazy<BTreeMap<&'static str, ObjectTypeDescriptor>> = Lazy::new(build_registry);

/// Looks up the descriptor for an object type.
pub fn get_descriptor(object_type: &str) -> ObjectResult<&'static ObjectTypeDescriptor> {
    REGISTRY.get(object_type).ok_or_else(|| {
        ObjectError::new(
            "registry",
            ErrorKind::UnknownType,
            format!(
                "Unknown object type: {}. Available types: {}",
                object_type,
                object_types().join(", ")
            ),
        )
    })
}

/// Registered object type names in stable order.
pub fn object_types() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

/// Iterates every registered descriptor.
pub fn descriptors() -> impl Iterator<Item = &'static ObjectTypeDescriptor> {
    REGISTRY.values()
}

/// Case-insensitive check against the type's protected names.
///
/// Unknown types are never protected; lookups fail elsewhere.
pub fn is_protected(object_type: &str, name: &str) -> bool {
    REGISTRY
        .get(object_type)
        .is_some_and(|descriptor| descriptor.is_protected(name))
}

/// Parent parameters a type needs, in path order.
pub fn required_parent_params(object_type: &str) -> ObjectResult<&'static [&'static str]> {
    get_descriptor(object_type).map(|d| d.parent_params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_registered() {
        assert_eq!(
            object_types(),
            vec![
                "database",
                "database_role",
                "function",
                "procedure",
                "role",
                "schema",
                "table",
                "view",
                "warehouse"
            ]
        );
    }

    #[test]
    fn test_parent_params_match_templates() {
        for descriptor in descriptors() {
            let placeholders = descriptor.collection_path.placeholders();
            assert_eq!(
                placeholders,
                descriptor.parent_params.to_vec(),
                "{}",
                descriptor.object_type
            );
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = get_descriptor("stage").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType);
        assert!(err.message.contains("Available types"));
    }

    #[test]
    fn test_is_protected_case_insensitive() {
        assert!(is_protected("database", "snowflake_sample_data"));
        assert!(is_protected("database", "Snowflake"));
        assert!(is_protected("role", "accountadmin"));
        assert!(!is_protected("database", "ANALYTICS"));
        assert!(!is_protected("schema", "SNOWFLAKE"));
        assert!(!is_protected("stage", "SNOWFLAKE"));
    }

    #[test]
    fn test_required_parent_params() {
        assert!(required_parent_params("database").unwrap().is_empty());
        assert_eq!(required_parent_params("schema").unwrap(), &["database"]);
        assert_eq!(required_parent_params("view").unwrap(), &["database", "schema"]);
        assert!(required_parent_params("stage").is_err());
    }

    #[test]
    fn test_complex_types() {
        let complex: Vec<_> = descriptors()
            .filter(|d| d.is_complex())
            .map(|d| d.object_type)
            .collect();
        assert_eq!(complex, vec!["function", "procedure", "table", "view"]);
    }
}
