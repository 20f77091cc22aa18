//! MCP tool definitions and registry.

pub(crate) mod args;
pub mod create;
pub mod describe;
pub mod descriptions;
pub mod drop;
pub mod list;
pub mod registry;

pub use create::CreateObjectTool;
pub use describe::DescribeObjectTool;
pub use drop::DropObjectTool;
pub use list::ListObjectsTool;
pub use registry::{ToolHandler, ToolRegistry, object_result};

use crate::objects::ManagerCache;
use std::sync::Arc;

/// Create and register all tools.
pub fn create_registry(managers: Arc<ManagerCache>) -> ToolRegistry {
    let registry = ToolRegistry::new();

    registry.register(CreateObjectTool::new(Arc::clone(&managers)));
    registry.register(ListObjectsTool::new(Arc::clone(&managers)));
    registry.register(DescribeObjectTool::new(Arc::clone(&managers)));
    registry.register(DropObjectTool::new(managers));

    registry
}
