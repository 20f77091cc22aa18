//! User-defined function creation.

use crate::error::ObjectResult;
use crate::objects::manager::ObjectManager;
use crate::objects::request::{CreateRequest, OperationOutcome};
use crate::objects::routine::RoutineDefinition;
use crate::warehouse::{CreateMode, ObjectPayload};
use serde_json::json;

pub(crate) async fn create(manager: &ObjectManager, request: &CreateRequest) -> ObjectResult<OperationOutcome> {
    let definition =
        RoutineDefinition::from_request(manager.object_type(), request, &manager.descriptor().validation)?;

    let collection = manager.collection(&request.parents)?;
    let client = manager.client()?;

    let payload = ObjectPayload::named(&request.name)
        .with("arguments", definition.arguments_payload())
        .with("returns", definition.return_type.as_str())
        .with("language", definition.language.as_str())
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
    use crate::objects::request::ParentContext;
    use crate::registry::get_descriptor;
    use crate::warehouse::memory::{Call, MemoryWarehouse};
    use crate::warehouse::{WarehouseClient, WarehouseHandle};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_function() {
        let warehouse = Arc::new(MemoryWarehouse::new());
        let manager = ObjectManager::new(
            get_descriptor("function").unwrap(),
            WarehouseHandle::with_client(Arc::clone(&warehouse) as Arc<dyn WarehouseClient>),
        );
        let request = CreateRequest::new("ADD_ONE")
            .parents(ParentContext::new().with("database", "SALES").with("schema", "UTIL"))
            .param("arguments", json!([{"name": "x", "type": "integer"}]))
            .param("returns", "integer")
            .param("body", "x + 1");

        let outcome = manager.create(request).await.unwrap();
        assert_eq!(outcome.message, "Function 'ADD_ONE' created successfully");
        assert_eq!(outcome.attributes["arguments"], json!([{"name": "x", "type": "INT"}]));
        assert_eq!(outcome.attributes["returns"], "integer");
        assert_eq!(outcome.attributes["language"], "SQL");

        match &warehouse.calls()[0] {
            Call::Create { collection, payload, .. } => {
                assert_eq!(collection, "databases[SALES].schemas[UTIL].functions");
                assert_eq!(payload.get("returns"), Some(&json!("INT")));
                assert_eq!(payload.get("arguments"), Some(&json!([{"name": "x", "datatype": "INT"}])));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decimal_scale_preserved() {
        let warehouse = Arc::new(MemoryWarehouse::new());
        let manager = ObjectManager::new(
            get_descriptor("function").unwrap(),
            WarehouseHandle::with_client(Arc::clone(&warehouse) as Arc<dyn WarehouseClient>),
        );
        let request = CreateRequest::new("ROUND_PRICE")
            .parents(ParentContext::new().with("database", "SALES").with("schema", "UTIL"))
            .param("arguments", json!([{"name": "price", "type": "DECIMAL(38,2)"}]))
            .param("returns", "decimal(38,2)")
            .param("body", "ROUND(price, 2)");

        manager.create(request).await.unwrap();

        match &warehouse.calls()[0] {
            Call::Create { payload, .. } => {
                assert_eq!(payload.get("returns"), Some(&json!("DECIMAL(38,2)")));
                assert_eq!(
                    payload.get("arguments"),
                    Some(&json!([{"name": "price", "datatype": "DECIMAL(38,2)"}]))
                );
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}
