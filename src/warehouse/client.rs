//! Warehouse client trait.

use crate::error::WarehouseResult;
use crate::warehouse::types::{CollectionPath, CreateMode, DropOptions, ObjectPayload, RemoteObject};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// Object-management operations of the external warehouse.
///
/// Implementations: [`RestWarehouseClient`](crate::warehouse::RestWarehouseClient).
/// Each call is a single remote operation; callers do not retry.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Returns the client name (e.g., "snowflake-rest").
    fn name(&self) -> &'static str;

    /// Creates `payload` inside `collection`.
    async fn create(
        &self,
        collection: &CollectionPath,
        payload: &ObjectPayload,
        mode: CreateMode,
    ) -> WarehouseResult<()>;

    /// Streams the objects in `collection`, optionally filtered by a LIKE pattern.
    ///
    /// The stream is lazy and finite; every call starts a fresh listing.
    fn iter<'a>(
        &'a self,
        collection: &'a CollectionPath,
        like: Option<&'a str>,
    ) -> BoxStream<'a, WarehouseResult<RemoteObject>>;

    /// Fetches the full attribute map of one object.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::NotFound`](crate::error::WarehouseError::NotFound)
    /// when the object does not exist.
    async fn fetch(&self, collection: &CollectionPath, name: &str) -> WarehouseResult<Value>;

    /// Drops one object.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::NotFound`](crate::error::WarehouseError::NotFound)
    /// when the object does not exist and `if_exists` is false.
    async fn drop_object(
        &self,
        collection: &CollectionPath,
        name: &str,
        options: DropOptions,
    ) -> WarehouseResult<()>;

    /// Executes a single SQL statement on the session.
    async fn execute(&self, statement: &str) -> WarehouseResult<()>;
}
