//! Generic object manager: create, list, describe and drop for one object type.

use crate::error::{ErrorKind, ObjectError, ObjectResult, WarehouseError};
use crate::objects::payload;
use crate::objects::request::{
    CreateRequest, DescribeRequest, DropRequest, ListRequest, ObjectDetails, ObjectSummary,
    OperationOutcome, ParentContext,
};
use crate::objects::{function, procedure, table, view};
use crate::registry::{CreateBuilder, ObjectTypeDescriptor};
use crate::warehouse::{CollectionPath, DropOptions, RemoteObject, WarehouseClient, WarehouseHandle};
use futures::{StreamExt, TryStreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Manages every object of one registered type.
pub struct ObjectManager {
    descriptor: &'static ObjectTypeDescriptor,
    warehouse: WarehouseHandle,
}

impl fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectManager")
            .field("object_type", &self.descriptor.object_type)
            .field("connected", &self.warehouse.is_connected())
            .finish()
    }
}

impl ObjectManager {
    pub fn new(descriptor: &'static ObjectTypeDescriptor, warehouse: WarehouseHandle) -> Self {
        Self {
            descriptor,
            warehouse,
        }
    }

    pub fn descriptor(&self) -> &'static ObjectTypeDescriptor {
        self.descriptor
    }

    pub fn object_type(&self) -> &'static str {
        self.descriptor.object_type
    }

    pub(crate) fn client(&self) -> ObjectResult<Arc<dyn WarehouseClient>> {
        self.warehouse.get().map_err(|e| {
            ObjectError::new(
                self.object_type(),
                ErrorKind::Unknown,
                format!(
                    "No active Snowflake connection for {} operations: {}",
                    self.object_type(),
                    e
                ),
            )
        })
    }

    /// Substitutes parent values into the type's collection path.
    pub(crate) fn collection(&self, parents: &ParentContext) -> ObjectResult<CollectionPath> {
        self.descriptor
            .collection_path
            .resolve(|param| parents.get(param))
            .map_err(|param| {
                ObjectError::new(
                    self.object_type(),
                    ErrorKind::MissingParentParameter,
                    format!("Missing required parent parameter: {}", param),
                )
            })
    }

    /// Wraps a warehouse failure, classifying it by message.
    pub(crate) fn failure(&self, action: &str, name: &str, err: &WarehouseError) -> ObjectError {
        let message = format!(
            "Failed to {} {} '{}': {}",
            action,
            self.object_type(),
            name,
            err
        );
        error!("{}", message);
        ObjectError::new(self.object_type(), ErrorKind::classify(&err.to_string()), message)
    }

    /// Creates the object, routing composite types to their builder.
    #[instrument(skip(self, request), fields(object_type = self.object_type(), name = %request.name))]
    pub async fn create(&self, request: CreateRequest) -> ObjectResult<OperationOutcome> {
        info!("Creating {}: {}", self.object_type(), request.name);
        let outcome = match self.descriptor.builder {
            CreateBuilder::Flat => self.create_flat(&request).await,
            CreateBuilder::Table => table::create(self, &request).await,
            CreateBuilder::View => view::create(self, &request).await,
            CreateBuilder::Function => function::create(self, &request).await,
            CreateBuilder::Procedure => procedure::create(self, &request).await,
        }?;
        info!("Successfully created {}: {}", self.object_type(), request.name);
        Ok(outcome)
    }

    async fn create_flat(&self, request: &CreateRequest) -> ObjectResult<OperationOutcome> {
        let collection = self.collection(&request.parents)?;
        let client = self.client()?;
        let payload = payload::flat_payload(self.descriptor, &request.name, &request.params);
        let mode = payload::create_mode(&request.params);

        client
            .create(&collection, &payload, mode)
            .await
            .map_err(|e| self.failure("create", &request.name, &e))?;

        Ok(self.created(&request.name))
    }

    /// Success result shared by every create path.
    pub(crate) fn created(&self, name: &str) -> OperationOutcome {
        OperationOutcome::new(
            self.object_type(),
            name,
            format!("{} '{}' created successfully", self.descriptor.display_name(), name),
        )
    }

    /// Lists objects, truncated at the request limit.
    #[instrument(skip(self, request), fields(object_type = self.object_type()))]
    pub async fn list(&self, request: ListRequest) -> ObjectResult<Vec<ObjectSummary>> {
        let pattern = request.pattern(self.object_type())?;
        info!(
            "Listing {}s with filter {:?}, limit {}",
            self.object_type(),
            pattern,
            request.limit
        );

        let collection = self.collection(&request.parents)?;
        let client = self.client()?;
        let limit = usize::try_from(request.limit).unwrap_or(0);

        let summaries: Vec<ObjectSummary> = client
            .iter(&collection, pattern.as_deref())
            .take(limit)
            .map_ok(|object| self.summarize(object))
            .try_collect()
            .await
            .map_err(|e| {
                let message = format!("Failed to list {}s: {}", self.object_type(), e);
                error!("{}", message);
                ObjectError::new(self.object_type(), ErrorKind::classify(&e.to_string()), message)
            })?;

        info!("Found {} {}(s)", summaries.len(), self.object_type());
        Ok(summaries)
    }

    fn summarize(&self, object: RemoteObject) -> ObjectSummary {
        let transient = if self.descriptor.uses_kind() {
            object.kind.as_deref().map(|kind| kind.eq_ignore_ascii_case("TRANSIENT"))
        } else {
            object.transient
        };
        ObjectSummary {
            name: object.name,
            object_type: self.object_type(),
            comment: object.comment.filter(|c| !c.is_empty()),
            created_on: object.created_on.map(|t| t.to_rfc3339()),
            owner: object.owner,
            transient,
        }
    }

    /// Fetches the full attribute map of one object.
    #[instrument(skip(self, request), fields(object_type = self.object_type(), name = %request.name))]
    pub async fn describe(&self, request: DescribeRequest) -> ObjectResult<ObjectDetails> {
        let collection = self.collection(&request.parents)?;
        let client = self.client()?;

        match client.fetch(&collection, &request.name).await {
            Ok(attributes) => Ok(ObjectDetails {
                object_type: self.object_type(),
                name: request.name,
                attributes,
            }),
            Err(WarehouseError::NotFound(_)) => Err(self.not_found(&request.name)),
            Err(e) => Err(self.failure("describe", &request.name, &e)),
        }
    }

    /// Drops one object. Protected names are refused before any remote call.
    #[instrument(skip(self, request), fields(object_type = self.object_type(), name = %request.name))]
    pub async fn drop_object(&self, request: DropRequest) -> ObjectResult<OperationOutcome> {
        info!(
            "Dropping {}: {} (if_exists={}, cascade={})",
            self.object_type(),
            request.name,
            request.if_exists,
            request.cascade
        );

        if self.descriptor.is_protected(&request.name) {
            return Err(ObjectError::new(
                self.object_type(),
                ErrorKind::Protected,
                format!("Cannot drop system {}: {}", self.object_type(), request.name),
            ));
        }

        let collection = self.collection(&request.parents)?;
        let client = self.client()?;
        let options = DropOptions {
            if_exists: request.if_exists,
            cascade: request.cascade,
        };

        let label = self.descriptor.display_name();
        match client.drop_object(&collection, &request.name, options).await {
            Ok(()) => {
                info!("Successfully dropped {}: {}", self.object_type(), request.name);
                Ok(OperationOutcome::new(
                    self.object_type(),
                    &request.name,
                    format!("{} '{}' dropped successfully", label, request.name),
                ))
            }
            Err(WarehouseError::NotFound(_)) if request.if_exists => {
                info!("{} '{}' does not exist (if_exists=true)", label, request.name);
                Ok(OperationOutcome::new(
                    self.object_type(),
                    &request.name,
                    format!("{} '{}' does not exist", label, request.name),
                ))
            }
            Err(WarehouseError::NotFound(_)) => Err(self.not_found(&request.name)),
            Err(e) => Err(self.failure("drop", &request.name, &e)),
        }
    }

    fn not_found(&self, name: &str) -> ObjectError {
        ObjectError::new(
            self.object_type(),
            ErrorKind::NotFound,
            format!("{} '{}' not found", self.descriptor.display_name(), name),
        )
    }
}
