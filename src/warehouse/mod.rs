//! Warehouse abstraction layer.
//!
//! The object managers talk to Snowflake only through [`WarehouseClient`].
//! [`RestWarehouseClient`] implements it over the Snowflake REST API v2, and
//! [`WarehouseHandle`] builds that client lazily from configuration.

pub mod client;
pub mod connection;
#[cfg(test)]
pub mod memory;
pub mod rest;
pub mod types;

pub use client::WarehouseClient;
pub use connection::{ConnectionMetadata, WarehouseHandle};
pub use rest::RestWarehouseClient;
pub use types::{CollectionPath, CreateMode, DropOptions, ObjectPayload, PathSegment, RemoteObject};
