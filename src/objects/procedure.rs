//! Stored procedure creation.

use crate::error::ObjectResult;
use crate::objects::manager::ObjectManager;
use crate::objects::request::{CreateRequest, OperationOutcome};
use crate::objects::routine::RoutineDefinition;
use crate::warehouse::{CreateMode, ObjectPayload};
use serde_json::{Value, json};

/// Language-specific configuration variant sent with a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureLanguage {
    Sql,
    JavaScript,
    Python,
    Java,
    Scala,
}

impl ProcedureLanguage {
    /// Unrecognized tags fall back to SQL.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_uppercase().as_str() {
            "JAVASCRIPT" => Self::JavaScript,
            "PYTHON" => Self::Python,
            "JAVA" => Self::Java,
            "SCALA" => Self::Scala,
            _ => Self::Sql,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sql => "SQL",
            Self::JavaScript => "JAVASCRIPT",
            Self::Python => "PYTHON",
            Self::Java => "JAVA",
            Self::Scala => "SCALA",
        }
    }

    pub fn config(self) -> Value {
        json!({ "language": self.as_str() })
    }
}

pub(crate) async fn create(manager: &ObjectManager, request: &CreateRequest) -> ObjectResult<OperationOutcome> {
    let definition =
        RoutineDefinition::from_request(manager.object_type(), request, &manager.descriptor().validation)?;
    let language = ProcedureLanguage::from_tag(&definition.language);

    let collection = manager.collection(&request.parents)?;
    let client = manager.client()?;

    let payload = ObjectPayload::named(&request.name)
        .with("arguments", definition.arguments_payload())
        .with(
            "return_type",
            json!({ "type": "DATATYPE", "datatype": definition.return_type }),
        )
        .with("language_config", language.config())
        .with("body", definition.body.as_str())
        .with_opt("comment", definition.comment.as_deref());

    client
        .create(&collection, &payload, CreateMode::ErrorIfExists)
        .await
        .map_err(|e| manager.failure("create", &request.name, &e))?;

    Ok(manager
        .created(&request.name)
        .attributes(request.parents.to_attributes())
        .attribute("arguments", json!(definition.arguments))
        .attribute("returns", definition.returns)
        .attribute("language", definition.language)
        .attribute("comment", definition.comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::objects::request::ParentContext;
    use crate::registry::get_descriptor;
    use crate::warehouse::memory::{Call, MemoryWarehouse};
    use crate::warehouse::{WarehouseClient, WarehouseHandle};
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryWarehouse>, ObjectManager) {
        let warehouse = Arc::new(MemoryWarehouse::new());
        let manager = ObjectManager::new(
            get_descriptor("procedure").unwrap(),
            WarehouseHandle::with_client(Arc::clone(&warehouse) as Arc<dyn WarehouseClient>),
        );
        (warehouse, manager)
    }

    #[test]
    fn test_language_variants() {
        assert_eq!(ProcedureLanguage::from_tag("python"), ProcedureLanguage::Python);
        assert_eq!(ProcedureLanguage::from_tag("JavaScript"), ProcedureLanguage::JavaScript);
        assert_eq!(ProcedureLanguage::from_tag("rust"), ProcedureLanguage::Sql);
        assert_eq!(ProcedureLanguage::Scala.config(), json!({"language": "SCALA"}));
    }

    #[tokio::test]
    async fn test_create_procedure() {
        let (warehouse, manager) = setup();
        let request = CreateRequest::new("CLEANUP")
            .parents(ParentContext::new().with("database", "SALES").with("schema", "OPS"))
            .param("arguments", json!([{"name": "days", "type": "NUMBER", "mode": "IN"}]))
            .param("returns", "varchar")
            .param("language", "javascript")
            .param("body", "return 'ok';");

        let outcome = manager.create(request).await.unwrap();
        assert_eq!(outcome.message, "Procedure 'CLEANUP' created successfully");
        assert_eq!(outcome.attributes["language"], "JAVASCRIPT");

        match &warehouse.calls()[0] {
            Call::Create { payload, .. } => {
                assert_eq!(payload.get("language_config"), Some(&json!({"language": "JAVASCRIPT"})));
                assert_eq!(payload.get("return_type").unwrap()["datatype"], "TEXT");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_language_uses_sql_config() {
        let (warehouse, manager) = setup();
        let request = CreateRequest::new("P")
            .parents(ParentContext::new().with("database", "SALES").with("schema", "OPS"))
            .param("returns", "INT")
            .param("language", "RUBY")
            .param("body", "SELECT 1");

        let outcome = manager.create(request).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.attributes["language"], "RUBY");

        match &warehouse.calls()[0] {
            Call::Create { payload, .. } => {
                assert_eq!(payload.get("language_config"), Some(&json!({"language": "SQL"})));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_mode_rejected() {
        let (warehouse, manager) = setup();
        let request = CreateRequest::new("P")
            .parents(ParentContext::new().with("database", "SALES").with("schema", "OPS"))
            .param("arguments", json!([{"name": "a", "type": "INT", "mode": "SIDEWAYS"}]))
            .param("returns", "INT")
            .param("body", "SELECT 1");
        let err = manager.create(request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(warehouse.calls().is_empty());
    }
}
