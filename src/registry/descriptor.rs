//! Registry entry types and collection-path templates.

use crate::warehouse::{CollectionPath, PathSegment};
use std::fmt;

/// Which create path an object type takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBuilder {
    /// Flat key/value payload handled by the generic manager.
    Flat,
    Table,
    View,
    Function,
    Procedure,
}

/// Numeric bounds, enum sets and protected names for one object type.
///
/// Empty slices and `None` mean "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    pub max_transient_retention_days: Option<i64>,
    pub max_permanent_retention_days: Option<i64>,
    pub protected_names: &'static [&'static str],
    pub warehouse_sizes: &'static [&'static str],
    pub warehouse_types: &'static [&'static str],
    pub scaling_policies: &'static [&'static str],
    pub auto_suspend_range: Option<(i64, i64)>,
    pub cluster_count_range: Option<(i64, i64)>,
    pub min_columns: Option<usize>,
    pub sql_must_start_with: Option<&'static str>,
    pub argument_modes: &'static [&'static str],
}

/// One segment of a collection-path template: `tables` or `schemas[{schema}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegmentTemplate {
    pub collection: &'static str,
    pub param: Option<&'static str>,
}

/// Parsed form of a dot-separated template such as
/// `databases[{database}].schemas[{schema}].tables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTemplate {
    raw: &'static str,
    segments: Vec<PathSegmentTemplate>,
}

impl CollectionTemplate {
    pub fn parse(raw: &'static str) -> Result<Self, String> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let segment = match part.split_once('[') {
                None => PathSegmentTemplate {
                    collection: part,
                    param: None,
                },
                Some((collection, rest)) => {
                    let param = rest
                        .strip_prefix('{')
                        .and_then(|r| r.strip_suffix("}]"))
                        .filter(|p| !p.is_empty())
                        .ok_or_else(|| format!("malformed segment '{}' in '{}'", part, raw))?;
                    PathSegmentTemplate {
                        collection,
                        param: Some(param),
                    }
                }
            };
            if segment.collection.is_empty() {
                return Err(format!("empty segment in '{}'", raw));
            }
            segments.push(segment);
        }
        Ok(Self { raw, segments })
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    pub fn segments(&self) -> &[PathSegmentTemplate] {
        &self.segments
    }

    /// Placeholder names in path order.
    pub fn placeholders(&self) -> Vec<&'static str> {
        self.segments.iter().filter_map(|s| s.param).collect()
    }

    /// Substitutes parent values into the template.
    ///
    /// Returns the name of the first placeholder `lookup` cannot fill.
    pub fn resolve<'a>(
        &self,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<CollectionPath, &'static str> {
        let mut segments = Vec::with_capacity(self.segments.len());
        for template in &self.segments {
            let item = match template.param {
                Some(param) => match lookup(param) {
                    Some(value) if !value.trim().is_empty() => Some(value.to_string()),
                    _ => return Err(param),
                },
                None => None,
            };
            segments.push(PathSegment {
                collection: template.collection.to_string(),
                item,
            });
        }
        Ok(CollectionPath::new(segments))
    }
}

impl fmt::Display for CollectionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

/// Registry entry for one object type. Immutable once built.
#[derive(Debug, Clone)]
pub struct ObjectTypeDescriptor {
    pub object_type: &'static str,
    pub collection_path: CollectionTemplate,
    pub allowed_parameters: &'static [&'static str],
    pub parent_params: &'static [&'static str],
    pub validation: ValidationRules,
    pub builder: CreateBuilder,
}

impl ObjectTypeDescriptor {
    /// Starts a descriptor. Templates are compile-time constants, so a
    /// malformed one is a programming error.
    pub(crate) fn new(
        object_type: &'static str,
        collection_path: &'static str,
        allowed_parameters: &'static [&'static str],
    ) -> Self {
        let collection_path = CollectionTemplate::parse(collection_path)
            .unwrap_or_else(|e| panic!("invalid collection path for '{}': {}", object_type, e));
        Self {
            object_type,
            collection_path,
            allowed_parameters,
            parent_params: &[],
            validation: ValidationRules::default(),
            builder: CreateBuilder::Flat,
        }
    }

    pub(crate) fn parents(mut self, parent_params: &'static [&'static str]) -> Self {
        self.parent_params = parent_params;
        self
    }

    pub(crate) fn validation(mut self, validation: ValidationRules) -> Self {
        self.validation = validation;
        self
    }

    pub(crate) fn builder(mut self, builder: CreateBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Checks that the path placeholders are exactly the declared parents.
    pub fn check_parents(&self) -> Result<(), String> {
        let placeholders = self.collection_path.placeholders();
        if placeholders != self.parent_params {
            return Err(format!(
                "path '{}' has placeholders {:?} but declares parents {:?}",
                self.collection_path, placeholders, self.parent_params
            ));
        }
        Ok(())
    }

    pub fn parent_required(&self) -> bool {
        !self.parent_params.is_empty()
    }

    pub fn is_complex(&self) -> bool {
        self.builder != CreateBuilder::Flat
    }

    pub fn allows(&self, parameter: &str) -> bool {
        self.allowed_parameters.contains(&parameter)
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.validation
            .protected_names
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Database and schema carry `kind` instead of a `transient` flag.
    pub fn uses_kind(&self) -> bool {
        matches!(self.object_type, "database" | "schema")
    }

    /// `Database`, `Database_role`, ... as used in result messages.
    pub fn display_name(&self) -> String {
        let mut chars = self.object_type.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_template() {
        let template = CollectionTemplate::parse("databases[{database}].schemas[{schema}].tables").unwrap();
        assert_eq!(template.segments().len(), 3);
        assert_eq!(template.placeholders(), vec!["database", "schema"]);
        assert_eq!(template.segments()[2].param, None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(CollectionTemplate::parse("databases[database].schemas").is_err());
        assert!(CollectionTemplate::parse("databases[{}].schemas").is_err());
        assert!(CollectionTemplate::parse("databases..schemas").is_err());
    }

    #[test]
    fn test_resolve() {
        let template = CollectionTemplate::parse("databases[{database}].schemas").unwrap();
        let path = template
            .resolve(|p| if p == "database" { Some("SALES") } else { None })
            .unwrap();
        assert_eq!(path.to_string(), "databases[SALES].schemas");

        let missing = template.resolve(|_| None).unwrap_err();
        assert_eq!(missing, "database");

        let blank = template.resolve(|_| Some("  ")).unwrap_err();
        assert_eq!(blank, "database");
    }

    #[test]
    fn test_check_parents_detects_mismatch() {
        let descriptor = ObjectTypeDescriptor::new("schema", "databases[{database}].schemas", &[]);
        assert!(descriptor.check_parents().is_err());
        assert!(descriptor.parents(&["database"]).check_parents().is_ok());
    }

    #[test]
    fn test_display_name() {
        let descriptor = ObjectTypeDescriptor::new("database_role", "roles", &[]);
        assert_eq!(descriptor.display_name(), "Database_role");
    }
}
