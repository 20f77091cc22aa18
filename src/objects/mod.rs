//! Object managers.
//!
//! [`ObjectManager`] implements create, list, describe and drop for any
//! registered type over a [`WarehouseClient`](crate::warehouse::WarehouseClient).
//! Tables, views, functions and procedures take their own create path, chosen
//! by the descriptor's [`CreateBuilder`](crate::registry::CreateBuilder).

pub mod cache;
pub mod datatype;
pub mod function;
pub mod manager;
pub mod payload;
pub mod procedure;
pub mod request;
pub mod routine;
pub mod table;
pub mod view;

pub use cache::ManagerCache;
pub use manager::ObjectManager;
pub use request::{
    CreateRequest, DescribeRequest, DropRequest, ListRequest, ObjectDetails, ObjectSummary,
    OperationOutcome, ParentContext,
};
