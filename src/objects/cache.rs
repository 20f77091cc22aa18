//! Manager cache keyed by object type.

use crate::error::ObjectResult;
use crate::objects::manager::ObjectManager;
use crate::registry;
use crate::warehouse::WarehouseHandle;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// One manager per object type, created on first use.
pub struct ManagerCache {
    managers: DashMap<&'static str, Arc<ObjectManager>>,
    warehouse: WarehouseHandle,
}

impl ManagerCache {
    pub fn new(warehouse: WarehouseHandle) -> Self {
        Self {
            managers: DashMap::new(),
            warehouse,
        }
    }

    /// Returns the manager for `object_type`, failing with `UnknownType` for
    /// unregistered types.
    pub fn get(&self, object_type: &str) -> ObjectResult<Arc<ObjectManager>> {
        let descriptor = registry::get_descriptor(object_type)?;
        if let Some(manager) = self.managers.get(descriptor.object_type) {
            return Ok(Arc::clone(&*manager));
        }
        let manager = self
            .managers
            .entry(descriptor.object_type)
            .or_insert_with(|| {
                debug!("Creating manager for {}", descriptor.object_type);
                Arc::new(ObjectManager::new(descriptor, self.warehouse.clone()))
            });
        Ok(Arc::clone(&*manager))
    }

    pub fn warehouse(&self) -> &WarehouseHandle {
        &self.warehouse
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::objects::DropRequest;
    use crate::warehouse::memory::MemoryWarehouse;
    use crate::warehouse::{RemoteObject, WarehouseClient};

    #[test]
    fn test_manager_reused() {
        let cache = ManagerCache::new(WarehouseHandle::new(None));
        assert!(cache.is_empty());

        let first = cache.get("table").unwrap();
        let second = cache.get("table").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.object_type(), "table");

        cache.get("view").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unknown_type() {
        let cache = ManagerCache::new(WarehouseHandle::new(None));
        let err = cache.get("pipe").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_manager_debug() {
        let cache = ManagerCache::new(WarehouseHandle::new(None));
        let manager = cache.get("schema").unwrap();
        let rendered = format!("{manager:?}");
        assert!(rendered.contains("object_type: \"schema\""));
        assert!(rendered.contains("connected: false"));
    }

    #[tokio::test]
    async fn test_drop_through_shared_manager() {
        let warehouse = Arc::new(MemoryWarehouse::new());
        warehouse.seed("warehouses", RemoteObject::named("OLD_WH"));
        let cache = ManagerCache::new(WarehouseHandle::with_client(
            Arc::clone(&warehouse) as Arc<dyn WarehouseClient>
        ));

        let manager = cache.get("warehouse").unwrap();
        let outcome = manager.drop_object(DropRequest::new("OLD_WH")).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Warehouse 'OLD_WH' dropped successfully");
    }
}
