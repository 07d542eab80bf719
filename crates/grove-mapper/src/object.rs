use std::any::Any;

use grove_types::{ResourceId, Value};

use crate::classify::FieldDescriptor;
use crate::error::MapperResult;

/// The runtime value of one classified field, as exchanged between a
/// mapped object and the mapper.
///
/// `Absent` stands for both "field is empty" and "field was skipped"; a
/// lazily read list is `Absent` and must never be interpreted as evidence
/// that the store holds nothing for it.
pub enum FieldValue {
    Absent,
    Literal(Value),
    Link(ResourceId),
    Resource(Box<dyn MappedObject>),
    List(Vec<Box<dyn MappedObject>>),
}

/// A domain object the mapper can persist.
///
/// The trait is object-safe so embedded resources of arbitrary concrete
/// types can be traversed uniformly; implementations are plain hand-written
/// tables and accessors, one per domain type.
pub trait MappedObject: Send + std::fmt::Debug {
    /// The graph type namespace written as the object's rdf-type edge.
    fn type_namespace(&self) -> &'static str;

    /// The identity path segment for this type.
    fn type_segment(&self) -> &'static str;

    /// The assigned identity, if any. Identity is assigned before the
    /// first write and immutable thereafter.
    fn id(&self) -> Option<&ResourceId>;

    /// Assign (or overwrite) the identity. Used by the mapper for derived
    /// list-element identities and during hydration.
    fn assign_id(&mut self, id: ResourceId);

    /// The static descriptor table for this type.
    fn descriptors(&self) -> &'static [FieldDescriptor];

    /// Snapshot the current value of a field. Unknown fields yield
    /// `Absent`.
    fn field_value(&self, field: &str) -> FieldValue;

    /// Replace the value of a field during hydration or list renumbering.
    fn set_field(&mut self, field: &str, value: FieldValue) -> MapperResult<()>;

    /// Downcast support: concrete types recover themselves from boxed
    /// embedded values with `into_any().downcast::<T>()`.
    fn as_any(&self) -> &dyn Any;

    /// Consuming variant of [`Self::as_any`].
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}
