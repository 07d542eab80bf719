//! Object-graph mapper for grove.
//!
//! Serializes domain objects into graph edges and materializes them back,
//! driven by a compile-time registry of per-field descriptors instead of
//! runtime type inspection. Each mapped type declares a static table of
//! [`FieldDescriptor`]s naming the predicate, the field's role, and (for
//! embedded resources) a factory for hydration.
//!
//! # Field Roles
//!
//! - [`FieldRole::Literal`] — a typed value stored as a direct edge
//! - [`FieldRole::Link`] — a non-owned reference, never traversed on
//!   remove/rewrite
//! - [`FieldRole::Resource`] — a single embedded resource whose lifecycle
//!   is owned by the parent
//! - [`FieldRole::List`] — an ordered list of embedded resources; order is
//!   encoded in an `@pos<N>` identity suffix because the graph has no
//!   native list type
//! - [`FieldRole::LazyList`] — a list that read/write operations may skip
//!   for performance; skipping never means deletion

pub mod classify;
pub mod error;
pub mod mapper;
pub mod object;

pub use classify::{classify, FieldDescriptor, FieldRole};
pub use error::{MapperError, MapperResult};
pub use mapper::GraphMapper;
pub use object::{FieldValue, MappedObject};

#[cfg(test)]
mod fixtures;
