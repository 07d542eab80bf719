use grove_store::{Edge, Node, StoreHandle};
use grove_types::{terms, ResourceId, Value};
use tracing::{debug, warn};

use crate::classify::{FieldDescriptor, FieldRole};
use crate::error::{MapperError, MapperResult};
use crate::object::{FieldValue, MappedObject};

/// Serializes mapped objects into edges and materializes them back.
///
/// The mapper comes in two flavours sharing all code paths: the default
/// one handles every declared field, the lazy one (see [`Self::lazy`])
/// skips [`FieldRole::LazyList`] fields on every operation. Skipping is
/// strictly a visibility concern -- a lazy update never deletes the edges
/// of fields it skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphMapper {
    lazy: bool,
}

impl GraphMapper {
    /// A mapper that handles every declared field.
    pub fn new() -> Self {
        Self { lazy: false }
    }

    /// A mapper that skips lazy lists on reads, writes and removals.
    pub fn lazy() -> Self {
        Self { lazy: true }
    }

    fn active(&self, descriptor: &FieldDescriptor) -> bool {
        !(self.lazy && descriptor.role.is_lazy())
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Serialize `object` and every owned embedded resource into edges.
    ///
    /// The object must already carry an identity. List elements are
    /// assigned derived identities carrying their `@pos<N>` suffix; the
    /// assignments are written back into `object` so the caller observes
    /// the final identities.
    pub fn write(
        &self,
        handle: &mut dyn StoreHandle,
        object: &mut dyn MappedObject,
    ) -> MapperResult<()> {
        let id = match object.id() {
            Some(id) => id.clone(),
            None => {
                return Err(MapperError::MissingIdentity {
                    type_segment: object.type_segment().to_string(),
                })
            }
        };
        debug!(subject = %id, segment = object.type_segment(), lazy = self.lazy, "write");

        handle.add(Edge::literal(
            id.clone(),
            terms::RDF_TYPE,
            Value::Uri(object.type_namespace().to_string()),
        ))?;

        for descriptor in object.descriptors() {
            if !self.active(descriptor) {
                continue;
            }
            self.write_field(handle, object, &id, descriptor)
                .map_err(|e| e.in_field(descriptor.name, &id))?;
        }
        Ok(())
    }

    fn write_field(
        &self,
        handle: &mut dyn StoreHandle,
        object: &mut dyn MappedObject,
        id: &ResourceId,
        descriptor: &FieldDescriptor,
    ) -> MapperResult<()> {
        match (descriptor.role, object.field_value(descriptor.name)) {
            (_, FieldValue::Absent) => Ok(()),
            (FieldRole::Literal, FieldValue::Literal(value)) => {
                // Empty values produce no edge at all.
                if !value.is_empty() {
                    handle.add(Edge::literal(id.clone(), descriptor.predicate, value))?;
                }
                Ok(())
            }
            (FieldRole::Link, FieldValue::Link(target)) => {
                handle.add(Edge::link(id.clone(), descriptor.predicate, target))?;
                Ok(())
            }
            (FieldRole::Resource, FieldValue::Resource(mut child)) => {
                let child_id = match child.id() {
                    Some(child_id) => child_id.clone(),
                    None => {
                        // An embedded resource without an identity cannot
                        // be addressed; it is skipped rather than failing
                        // the whole write.
                        warn!(
                            subject = %id,
                            field = descriptor.name,
                            "embedded resource has no identity, skipping"
                        );
                        return Ok(());
                    }
                };
                handle.add(Edge::link(id.clone(), descriptor.predicate, child_id))?;
                self.write(handle, child.as_mut())?;
                object.set_field(descriptor.name, FieldValue::Resource(child))
            }
            (FieldRole::List | FieldRole::LazyList, FieldValue::List(mut children)) => {
                for (pos, child) in children.iter_mut().enumerate() {
                    // Position lives in the identity suffix; pre-existing
                    // identities are renumbered, fresh ones derived from
                    // the parent.
                    let child_id = match child.id() {
                        Some(existing) => existing.with_position(pos),
                        None => id.child(child.type_segment(), pos),
                    };
                    child.assign_id(child_id.clone());
                    handle.add(Edge::link(id.clone(), descriptor.predicate, child_id))?;
                    self.write(handle, child.as_mut())?;
                }
                object.set_field(descriptor.name, FieldValue::List(children))
            }
            (role, _) => {
                warn!(
                    subject = %id,
                    field = descriptor.name,
                    ?role,
                    "field value does not match its declared role, skipping"
                );
                Ok(())
            }
        }
    }

    /// Replace the stored form of `object` with its current state.
    ///
    /// Stale embedded resources are discovered store-side, so list
    /// elements dropped from the in-memory object are removed and the
    /// survivors renumbered gap-free. Skipped lazy fields keep their
    /// stored edges untouched.
    pub fn update(
        &self,
        handle: &mut dyn StoreHandle,
        object: &mut dyn MappedObject,
    ) -> MapperResult<()> {
        let id = match object.id() {
            Some(id) => id.clone(),
            None => {
                return Err(MapperError::MissingIdentity {
                    type_segment: object.type_segment().to_string(),
                })
            }
        };
        self.remove_stored(handle, &id, object.descriptors())?;
        self.write(handle, object)
    }

    /// Remove the stored form of `object` and every owned embedded
    /// resource.
    pub fn remove(
        &self,
        handle: &mut dyn StoreHandle,
        object: &dyn MappedObject,
    ) -> MapperResult<()> {
        let id = match object.id() {
            Some(id) => id.clone(),
            None => {
                return Err(MapperError::MissingIdentity {
                    type_segment: object.type_segment().to_string(),
                })
            }
        };
        debug!(subject = %id, lazy = self.lazy, "remove");
        self.remove_stored(handle, &id, object.descriptors())
    }

    /// Removes the subject's stored edges plus the transitive closure of
    /// its owned embedded resources, as found in the store rather than in
    /// the in-memory object.
    fn remove_stored(
        &self,
        handle: &mut dyn StoreHandle,
        id: &ResourceId,
        descriptors: &'static [FieldDescriptor],
    ) -> MapperResult<()> {
        for descriptor in descriptors {
            if !self.active(descriptor) || !descriptor.role.is_owned() {
                continue;
            }
            let children: Vec<ResourceId> = handle
                .edges_of(id)?
                .into_iter()
                .filter(|e| e.predicate == descriptor.predicate)
                .filter_map(|e| e.object.as_resource().cloned())
                .collect();
            let child_descriptors = descriptor
                .child
                .map(|factory| factory().descriptors())
                .unwrap_or(&[]);
            for child in children {
                self.remove_stored(handle, &child, child_descriptors)
                    .map_err(|e| e.in_field(descriptor.name, id))?;
            }
        }

        if self.lazy {
            // Leave the edges of skipped fields in place.
            handle.remove_edges(id, terms::RDF_TYPE)?;
            for descriptor in descriptors {
                if self.active(descriptor) {
                    handle.remove_edges(id, descriptor.predicate)?;
                }
            }
        } else {
            handle.remove_subject(id)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Whether the identity holds at least one edge.
    pub fn exists(&self, handle: &dyn StoreHandle, id: &ResourceId) -> MapperResult<bool> {
        Ok(handle.contains(id)?)
    }

    /// Materialize the stored state of `object`'s identity into `object`.
    ///
    /// Fails with [`MapperError::NotFound`] if the identity has no edges.
    /// Lazy-skipped list fields are left exactly as the caller passed
    /// them in.
    pub fn read(
        &self,
        handle: &dyn StoreHandle,
        object: &mut dyn MappedObject,
    ) -> MapperResult<()> {
        let id = match object.id() {
            Some(id) => id.clone(),
            None => {
                return Err(MapperError::MissingIdentity {
                    type_segment: object.type_segment().to_string(),
                })
            }
        };
        let edges = handle.edges_of(&id)?;
        if edges.is_empty() {
            return Err(MapperError::NotFound(id));
        }

        for descriptor in object.descriptors() {
            if !self.active(descriptor) {
                continue;
            }
            let value = self
                .read_field(handle, &edges, descriptor)
                .map_err(|e| e.in_field(descriptor.name, &id))?;
            object
                .set_field(descriptor.name, value)
                .map_err(|e| e.in_field(descriptor.name, &id))?;
        }
        Ok(())
    }

    fn read_field(
        &self,
        handle: &dyn StoreHandle,
        edges: &[Edge],
        descriptor: &FieldDescriptor,
    ) -> MapperResult<FieldValue> {
        let objects = edges
            .iter()
            .filter(|e| e.predicate == descriptor.predicate)
            .map(|e| &e.object);

        match descriptor.role {
            FieldRole::Literal => {
                let kind = descriptor.literal_kind.ok_or_else(|| {
                    MapperError::UnknownField {
                        type_segment: String::new(),
                        field: descriptor.name.to_string(),
                    }
                })?;
                for node in objects {
                    if let Node::Literal(value) = node {
                        // Stored kind may predate a declaration change;
                        // re-parse through the rendered form in that case.
                        let value = if value.kind() == kind {
                            value.clone()
                        } else {
                            Value::parse_as(kind, &value.render())?
                        };
                        return Ok(FieldValue::Literal(value));
                    }
                }
                Ok(FieldValue::Absent)
            }
            FieldRole::Link => {
                for node in objects {
                    if let Node::Resource(target) = node {
                        return Ok(FieldValue::Link(target.clone()));
                    }
                }
                Ok(FieldValue::Absent)
            }
            FieldRole::Resource => {
                for node in objects {
                    if let Node::Resource(child_id) = node {
                        let child = self.hydrate_child(handle, descriptor, child_id)?;
                        return Ok(FieldValue::Resource(child));
                    }
                }
                Ok(FieldValue::Absent)
            }
            FieldRole::List | FieldRole::LazyList => {
                let mut ids: Vec<&ResourceId> =
                    objects.filter_map(|n| n.as_resource()).collect();
                ids.sort_by_key(|id| id.position().unwrap_or(usize::MAX));
                let mut children = Vec::with_capacity(ids.len());
                for child_id in ids {
                    children.push(self.hydrate_child(handle, descriptor, child_id)?);
                }
                Ok(FieldValue::List(children))
            }
        }
    }

    fn hydrate_child(
        &self,
        handle: &dyn StoreHandle,
        descriptor: &FieldDescriptor,
        child_id: &ResourceId,
    ) -> MapperResult<Box<dyn MappedObject>> {
        let factory = descriptor.child.ok_or_else(|| MapperError::UnknownField {
            type_segment: String::new(),
            field: descriptor.name.to_string(),
        })?;
        let mut child = factory();
        child.assign_id(child_id.clone());
        self.read(handle, child.as_mut())?;
        Ok(child)
    }
}
