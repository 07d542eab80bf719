use std::sync::Arc;
use std::thread;

use grove_mapper::{GraphMapper, MappedObject, MapperError};
use grove_store::{AccessMode, GraphStore, Node, StoreHandle};
use grove_tx::{TxError, WriterLane};
use grove_types::{terms, GrantRight, ResourceId, Status, User, Value};
use tracing::{debug, error};

use crate::error::{FacadeError, FacadeResult};
use crate::traits::{
    AcceptAllValidator, GrantChecker, GrantTableChecker, NoopIndexer, SearchIndexer,
    ValidationMethod, Validator,
};

#[derive(Clone, Copy)]
enum WriteOp {
    Write,
    Update,
    Remove,
}

/// Orchestrates validation, authorization, mapping and index
/// notification around each CRUD operation.
///
/// Writes run on the facade's writer lane and block until committed;
/// the index notification afterwards is fire-and-forget on a detached
/// thread.
pub struct ObjectFacade {
    store: Arc<dyn GraphStore>,
    lane: WriterLane,
    validator: Arc<dyn Validator>,
    grants: Arc<dyn GrantChecker>,
    indexer: Arc<dyn SearchIndexer>,
}

impl ObjectFacade {
    /// A facade with permissive collaborators: no validation rules, the
    /// user's own grant table, no index.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_collaborators(
            store,
            Arc::new(AcceptAllValidator),
            Arc::new(GrantTableChecker),
            Arc::new(NoopIndexer),
        )
    }

    pub fn with_collaborators(
        store: Arc<dyn GraphStore>,
        validator: Arc<dyn Validator>,
        grants: Arc<dyn GrantChecker>,
        indexer: Arc<dyn SearchIndexer>,
    ) -> Self {
        let lane = WriterLane::new(store.clone());
        Self {
            store,
            lane,
            validator,
            grants,
            indexer,
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Persist a batch of new objects. Objects without an identity are
    /// assigned a generated one; the returned batch carries the final
    /// identities.
    pub fn create(
        &self,
        mut objects: Vec<Box<dyn MappedObject>>,
        user: Option<&User>,
    ) -> FacadeResult<Vec<Box<dyn MappedObject>>> {
        if objects.is_empty() {
            return Ok(objects);
        }
        for object in objects.iter_mut() {
            if object.id().is_none() {
                object.assign_id(ResourceId::generate(terms::BASE_URI, object.type_segment()));
            }
        }
        self.validate_all(&objects, ValidationMethod::Create)?;
        self.authorize_all(&objects, user, GrantRight::Create)?;
        let objects = self.run_write(objects, GraphMapper::new(), WriteOp::Write)?;
        self.notify_index(&objects, false);
        Ok(objects)
    }

    /// Rewrite a batch of existing objects, embedded subgraphs included.
    pub fn update(
        &self,
        objects: Vec<Box<dyn MappedObject>>,
        user: Option<&User>,
    ) -> FacadeResult<Vec<Box<dyn MappedObject>>> {
        self.update_with(objects, user, GraphMapper::new())
    }

    /// Like [`Self::update`] but skips lazy list fields, leaving their
    /// stored contents untouched.
    pub fn update_lazy(
        &self,
        objects: Vec<Box<dyn MappedObject>>,
        user: Option<&User>,
    ) -> FacadeResult<Vec<Box<dyn MappedObject>>> {
        self.update_with(objects, user, GraphMapper::lazy())
    }

    fn update_with(
        &self,
        objects: Vec<Box<dyn MappedObject>>,
        user: Option<&User>,
        mapper: GraphMapper,
    ) -> FacadeResult<Vec<Box<dyn MappedObject>>> {
        if objects.is_empty() {
            return Ok(objects);
        }
        self.validate_all(&objects, ValidationMethod::Update)?;
        self.authorize_all(&objects, user, GrantRight::Update)?;
        self.ensure_exist(&objects)?;
        let objects = self.run_write(objects, mapper, WriteOp::Update)?;
        self.notify_index(&objects, false);
        Ok(objects)
    }

    /// Delete a batch of existing objects and their owned subgraphs.
    pub fn delete(
        &self,
        objects: Vec<Box<dyn MappedObject>>,
        user: Option<&User>,
    ) -> FacadeResult<()> {
        if objects.is_empty() {
            return Ok(());
        }
        self.validate_all(&objects, ValidationMethod::Delete)?;
        self.authorize_all(&objects, user, GrantRight::Delete)?;
        self.ensure_exist(&objects)?;
        let objects = self.run_write(objects, GraphMapper::new(), WriteOp::Remove)?;
        self.notify_index(&objects, true);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Hydrate `object` from the store, subject to read visibility:
    /// released and withdrawn objects are public, everything else needs
    /// a grant on the object or its container.
    pub fn read(&self, object: &mut dyn MappedObject, user: Option<&User>) -> FacadeResult<()> {
        self.read_with(object, user, GraphMapper::new())
    }

    /// Like [`Self::read`] but leaves lazy list fields unhydrated.
    pub fn read_lazy(
        &self,
        object: &mut dyn MappedObject,
        user: Option<&User>,
    ) -> FacadeResult<()> {
        self.read_with(object, user, GraphMapper::lazy())
    }

    fn read_with(
        &self,
        object: &mut dyn MappedObject,
        user: Option<&User>,
        mapper: GraphMapper,
    ) -> FacadeResult<()> {
        let id = require_id(object)?;
        let handle = self.store.open(AccessMode::Read)?;
        if !handle.contains(&id)? {
            return Err(FacadeError::Mapper(MapperError::NotFound(id)));
        }
        if !self.visible(handle.as_ref(), &id, user)? {
            return Err(match user {
                None => FacadeError::Authentication,
                Some(_) => FacadeError::Authorization { id },
            });
        }
        mapper.read(handle.as_ref(), object)?;
        Ok(())
    }

    fn visible(
        &self,
        handle: &dyn StoreHandle,
        id: &ResourceId,
        user: Option<&User>,
    ) -> FacadeResult<bool> {
        if let Some(Node::Literal(Value::Uri(uri))) = handle.object_of(id, terms::STATUS)? {
            if Status::from_uri(&uri).ok().is_some_and(|s| s.is_public()) {
                return Ok(true);
            }
        }
        if self.grants.allowed(user, id, GrantRight::Read) {
            return Ok(true);
        }
        if let Some(Node::Resource(container)) = handle.object_of(id, terms::CONTAINER)? {
            return Ok(self.grants.allowed(user, &container, GrantRight::Read));
        }
        Ok(false)
    }

    // -----------------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------------

    fn validate_all(
        &self,
        objects: &[Box<dyn MappedObject>],
        method: ValidationMethod,
    ) -> FacadeResult<()> {
        let mut violations = Vec::new();
        for object in objects {
            if let Err(mut found) = self.validator.validate(object.as_ref(), method) {
                violations.append(&mut found);
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(FacadeError::Validation(violations))
        }
    }

    fn authorize_all(
        &self,
        objects: &[Box<dyn MappedObject>],
        user: Option<&User>,
        right: GrantRight,
    ) -> FacadeResult<()> {
        if user.is_none() {
            return Err(FacadeError::Authentication);
        }
        for object in objects {
            let id = require_id(object.as_ref())?;
            if !self.grants.allowed(user, &id, right) {
                return Err(FacadeError::Authorization { id });
            }
        }
        Ok(())
    }

    fn ensure_exist(&self, objects: &[Box<dyn MappedObject>]) -> FacadeResult<()> {
        let handle = self.store.open(AccessMode::Read)?;
        for object in objects {
            let id = require_id(object.as_ref())?;
            if !handle.contains(&id)? {
                return Err(FacadeError::Mapper(MapperError::NotFound(id)));
            }
        }
        Ok(())
    }

    fn run_write(
        &self,
        mut objects: Vec<Box<dyn MappedObject>>,
        mapper: GraphMapper,
        op: WriteOp,
    ) -> FacadeResult<Vec<Box<dyn MappedObject>>> {
        let objects = self.lane.execute(move |handle| {
            for object in objects.iter_mut() {
                let step = match op {
                    WriteOp::Write => mapper.write(handle, object.as_mut()),
                    WriteOp::Update => mapper.update(handle, object.as_mut()),
                    WriteOp::Remove => mapper.remove(handle, object.as_ref()),
                };
                step.map_err(|e| TxError::failed(e.to_string()))?;
            }
            Ok(objects)
        })?;
        Ok(objects)
    }

    /// Fire-and-forget index notification. Failures are logged and never
    /// fail the operation; the index is reconciled out of band.
    fn notify_index(&self, objects: &[Box<dyn MappedObject>], deleted: bool) {
        let ids: Vec<ResourceId> = objects.iter().filter_map(|o| o.id().cloned()).collect();
        debug!(count = ids.len(), deleted, "notifying search index");
        let indexer = self.indexer.clone();
        thread::spawn(move || {
            let outcome = if deleted {
                indexer.delete_batch(&ids)
            } else {
                indexer.index_batch(&ids)
            };
            if let Err(message) = outcome {
                error!(%message, count = ids.len(), "index notification failed");
            }
        });
    }
}

fn require_id(object: &dyn MappedObject) -> FacadeResult<ResourceId> {
    object
        .id()
        .cloned()
        .ok_or_else(|| {
            FacadeError::Mapper(MapperError::MissingIdentity {
                type_segment: object.type_segment().to_string(),
            })
        })
}
