use grove_types::ValueKind;

use crate::object::MappedObject;

/// The role a classified field plays in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    /// A typed value stored as a direct edge.
    Literal,
    /// A non-owned reference to another resource; written as a plain
    /// link and never traversed during remove or rewrite.
    Link,
    /// A single embedded resource owned by this object.
    Resource,
    /// An ordered list of embedded resources.
    List,
    /// An ordered list that lazy operations may skip.
    LazyList,
}

impl FieldRole {
    /// Whether this role owns embedded resources.
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Resource | Self::List | Self::LazyList)
    }

    /// Whether lazy operations skip this role.
    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::LazyList)
    }
}

/// Declarative metadata for one persistable field.
///
/// Descriptor tables are `'static` and hand-written per domain type; they
/// replace runtime type inspection entirely.
pub struct FieldDescriptor {
    /// Field name, unique within its type's table.
    pub name: &'static str,
    /// Predicate namespace written for this field's edges.
    pub predicate: &'static str,
    /// The field's role.
    pub role: FieldRole,
    /// Declared literal kind; `Some` iff `role` is `Literal`.
    pub literal_kind: Option<ValueKind>,
    /// Factory producing an empty embedded instance for hydration;
    /// `Some` iff `role` owns resources.
    pub child: Option<fn() -> Box<dyn MappedObject>>,
}

impl FieldDescriptor {
    /// Descriptor for a literal field.
    pub const fn literal(
        name: &'static str,
        predicate: &'static str,
        kind: ValueKind,
    ) -> Self {
        Self {
            name,
            predicate,
            role: FieldRole::Literal,
            literal_kind: Some(kind),
            child: None,
        }
    }

    /// Descriptor for a non-owned link field.
    pub const fn link(name: &'static str, predicate: &'static str) -> Self {
        Self {
            name,
            predicate,
            role: FieldRole::Link,
            literal_kind: None,
            child: None,
        }
    }

    /// Descriptor for a single embedded resource.
    pub const fn resource(
        name: &'static str,
        predicate: &'static str,
        child: fn() -> Box<dyn MappedObject>,
    ) -> Self {
        Self {
            name,
            predicate,
            role: FieldRole::Resource,
            literal_kind: None,
            child: Some(child),
        }
    }

    /// Descriptor for an ordered list of embedded resources.
    pub const fn list(
        name: &'static str,
        predicate: &'static str,
        child: fn() -> Box<dyn MappedObject>,
    ) -> Self {
        Self {
            name,
            predicate,
            role: FieldRole::List,
            literal_kind: None,
            child: Some(child),
        }
    }

    /// Descriptor for a lazy ordered list.
    pub const fn lazy_list(
        name: &'static str,
        predicate: &'static str,
        child: fn() -> Box<dyn MappedObject>,
    ) -> Self {
        Self {
            name,
            predicate,
            role: FieldRole::LazyList,
            literal_kind: None,
            child: Some(child),
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .field("role", &self.role)
            .finish()
    }
}

/// Look up the descriptor for a field name.
///
/// Returns `None` for fields without metadata -- such fields have no role
/// and are simply not persisted.
pub fn classify<'a>(
    descriptors: &'a [FieldDescriptor],
    field: &str,
) -> Option<&'a FieldDescriptor> {
    descriptors.iter().find(|d| d.name == field)
}
