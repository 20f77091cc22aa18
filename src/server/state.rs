//! Server state management.

use crate::config::ServerConfig;
use crate::objects::ManagerCache;
use crate::protocol::ClientInfo;
use crate::tools::ToolRegistry;
use crate::warehouse::{ConnectionMetadata, WarehouseHandle};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct ServerState {
    pub config: ServerConfig,
    pub managers: Arc<ManagerCache>,
    pub tools: ToolRegistry,
    initialized: AtomicBool,
    client_info: RwLock<Option<ClientInfo>>,
    request_count: AtomicU64,
}

impl ServerState {
    pub fn new(config: ServerConfig, managers: Arc<ManagerCache>, tools: ToolRegistry) -> Self {
        Self {
            config,
            managers,
            tools,
            initialized: AtomicBool::new(false),
            client_info: RwLock::new(None),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn set_initialized(&self, client_info: ClientInfo) {
        *self.client_info.write() = Some(client_info);
        self.initialized.store(true, Ordering::SeqCst);
    }

    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client_info.read().clone()
    }

    pub fn next_request_id(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.managers.warehouse().is_connected()
    }

    pub fn is_configured(&self) -> bool {
        self.managers.warehouse().is_configured()
    }

    pub fn metadata(&self) -> ConnectionMetadata {
        self.managers.warehouse().metadata()
    }
}

#[derive(Default)]
pub struct ServerStateBuilder {
    config: Option<ServerConfig>,
    warehouse: Option<WarehouseHandle>,
}

impl ServerStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing warehouse handle instead of one built from the config.
    pub fn warehouse(mut self, warehouse: WarehouseHandle) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    pub fn build(self) -> Result<ServerState, &'static str> {
        let config = self.config.ok_or("Config is required")?;
        let warehouse = self
            .warehouse
            .unwrap_or_else(|| WarehouseHandle::new(config.snowflake.clone()));

        let managers = Arc::new(ManagerCache::new(warehouse));
        let tools = crate::tools::create_registry(Arc::clone(&managers));

        Ok(ServerState::new(config, managers, tools))
    }
}
