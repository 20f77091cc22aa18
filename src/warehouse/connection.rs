//! Thread-safe lazy client initialization with `Arc<RwLock<Option<...>>>`.

use crate::config::SnowflakeConfig;
use crate::error::{WarehouseError, WarehouseResult};
use crate::warehouse::client::WarehouseClient;
use crate::warehouse::rest::RestWarehouseClient;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What the handle knows about its connection, for logs and `describe`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionMetadata {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ConnectionMetadata {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            client: None,
            account: None,
            host: None,
            role: None,
        }
    }
}

/// Shared, lazily built warehouse client.
///
/// The client is constructed on first use from the stored configuration and
/// reused afterwards. Clones share the same slot.
pub struct WarehouseHandle {
    config: Option<SnowflakeConfig>,
    client: Arc<RwLock<Option<Arc<dyn WarehouseClient>>>>,
}

impl WarehouseHandle {
    pub fn new(config: Option<SnowflakeConfig>) -> Self {
        Self {
            config,
            client: Arc::new(RwLock::new(None)),
        }
    }

    /// Handle around an already-built client.
    pub fn with_client(client: Arc<dyn WarehouseClient>) -> Self {
        Self {
            config: None,
            client: Arc::new(RwLock::new(Some(client))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.read().is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some() || self.is_connected()
    }

    pub fn metadata(&self) -> ConnectionMetadata {
        let client = self.client.read().as_ref().map(|c| c.name());
        match (&self.config, client) {
            (None, None) => ConnectionMetadata::disconnected(),
            (config, client) => ConnectionMetadata {
                connected: client.is_some(),
                client,
                account: config.as_ref().map(|c| c.account.clone()),
                host: config.as_ref().map(|c| c.host.clone()),
                role: config.as_ref().and_then(|c| c.role.clone()),
            },
        }
    }

    /// Returns the client, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::NotConnected`] when no configuration is
    /// available or the client cannot be built.
    pub fn get(&self) -> WarehouseResult<Arc<dyn WarehouseClient>> {
        if let Some(client) = self.client.read().as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut slot = self.client.write();
        // Another caller may have won the race while we waited for the lock.
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let config = self.config.as_ref().ok_or_else(|| {
            WarehouseError::NotConnected(
                "set SNOWFLAKE_ACCOUNT (or SNOWFLAKE_HOST) and SNOWFLAKE_TOKEN".into(),
            )
        })?;

        debug!("Building Snowflake client for {}", config.host);
        let client: Arc<dyn WarehouseClient> = Arc::new(RestWarehouseClient::new(config)?);
        info!("Connected to Snowflake account {}", config.account);
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }
}

impl Clone for WarehouseHandle {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            client: Arc::clone(&self.client),
        }
    }
}
