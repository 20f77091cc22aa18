//! `drop_object`: drops any registered type, refusing protected names.

use crate::error::{ObjectResult, Result};
use crate::objects::{DropRequest, ManagerCache, OperationOutcome};
use crate::protocol::{CallToolResult, Tool};
use crate::registry;
use crate::tools::args;
use crate::tools::descriptions::{self, DROP_OBJECT};
use crate::tools::registry::{ToolHandler, object_result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DropObjectArgs {
    pub object_type: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub if_exists: bool,
    #[serde(default)]
    pub cascade: bool,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

pub struct DropObjectTool {
    managers: Arc<ManagerCache>,
}

impl DropObjectTool {
    pub fn new(managers: Arc<ManagerCache>) -> Self {
        Self { managers }
    }

    async fn drop_object(&self, arguments: Value) -> ObjectResult<OperationOutcome> {
        let args: DropObjectArgs = args::parse(DROP_OBJECT, arguments)?;
        let manager = self
            .managers
            .get(&args.object_type)
            .map_err(|e| e.with_tool(DROP_OBJECT))?;
        let descriptor = manager.descriptor();

        args::require_name(DROP_OBJECT, descriptor, &args.name, "dropping")?;
        // Missing parents surface from the manager once protection is checked.
        let (parents, _) =
            args::parent_context(descriptor, args.database.as_deref(), args.schema.as_deref());

        info!(
            "Dropping {}: {} (if_exists={}, cascade={})",
            descriptor.object_type, args.name, args.if_exists, args.cascade
        );

        let request = DropRequest {
            name: args.name.trim().to_string(),
            if_exists: args.if_exists,
            cascade: args.cascade,
            parents,
        };
        manager.drop_object(request).await.map_err(|e| e.with_tool(DROP_OBJECT))
    }
}

#[async_trait]
impl ToolHandler for DropObjectTool {
    fn definition(&self) -> Tool {
        let object_types = registry::object_types();
        crate::define_tool! {
            name: DROP_OBJECT,
            description: descriptions::drop_object(&object_types),
            schema: {
                "type": "object",
                "properties": {
                    "object_type": {
                        "type": "string",
                        "enum": object_types,
                        "description": "Type of object to drop"
                    },
                    "name": {
                        "type": "string",
                        "description": "Name of the object to drop"
                    },
                    "if_exists": {
                        "type": "boolean",
                        "description": "Succeed quietly when the object does not exist (default: true)"
                    },
                    "cascade": {
                        "type": "boolean",
                        "description": "Drop dependent objects as well (default: false)"
                    },
                    "database": {
                        "type": "string",
                        "description": "Database containing the object"
                    },
                    "schema": {
                        "type": "string",
                        "description": "Schema containing the object"
                    }
                },
                "required": ["object_type", "name"]
            }
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "drop_object"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        Ok(object_result(self.drop_object(arguments).await))
    }
}
