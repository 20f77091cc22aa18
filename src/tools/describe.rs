//! `describe_object`: full attribute map of one object.

use crate::error::{ObjectResult, Result};
use crate::objects::{DescribeRequest, ManagerCache, ObjectDetails};
use crate::protocol::{CallToolResult, Tool};
use crate::registry;
use crate::tools::args;
use crate::tools::descriptions::{self, DESCRIBE_OBJECT};
use crate::tools::registry::{ToolHandler, object_result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct DescribeObjectArgs {
    pub object_type: String,
    pub name: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

pub struct DescribeObjectTool {
    managers: Arc<ManagerCache>,
}

impl DescribeObjectTool {
    pub fn new(managers: Arc<ManagerCache>) -> Self {
        Self { managers }
    }

    async fn describe(&self, arguments: Value) -> ObjectResult<ObjectDetails> {
        let args: DescribeObjectArgs = args::parse(DESCRIBE_OBJECT, arguments)?;
        let manager = self
            .managers
            .get(&args.object_type)
            .map_err(|e| e.with_tool(DESCRIBE_OBJECT))?;
        let descriptor = manager.descriptor();

        args::require_name(DESCRIBE_OBJECT, descriptor, &args.name, "describing")?;
        let parents = args::required_parents(
            DESCRIBE_OBJECT,
            descriptor,
            args.database.as_deref(),
            args.schema.as_deref(),
            &format!("describing {}", descriptor.object_type),
        )?;

        let request = DescribeRequest {
            name: args.name.trim().to_string(),
            parents,
        };
        manager
            .describe(request)
            .await
            .map_err(|e| e.with_tool(DESCRIBE_OBJECT))
    }
}

#[async_trait]
impl ToolHandler for DescribeObjectTool {
    fn definition(&self) -> Tool {
        let object_types = registry::object_types();
        crate::define_tool! {
            name: DESCRIBE_OBJECT,
            description: descriptions::describe_object(&object_types),
            schema: {
                "type": "object",
                "properties": {
                    "object_type": {
                        "type": "string",
                        "enum": object_types,
                        "description": "Type of object to describe"
                    },
                    "name": {
                        "type": "string",
                        "description": "Name of the object"
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

    #[instrument(skip(self, arguments), fields(tool = "describe_object"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        Ok(object_result(self.describe(arguments).await))
    }
}
