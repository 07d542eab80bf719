//! Triple graph store boundary for grove.
//!
//! The store holds resources as sets of `(subject, predicate, object)`
//! edges and is accessed through short-lived handles with begin/commit/
//! close semantics. The process-wide contract is single-writer,
//! multi-reader: any number of read handles may be open concurrently, but
//! at most one write handle exists at any time.
//!
//! # Design Rules
//!
//! 1. A write handle stages its mutations; nothing is visible to readers
//!    before `commit`. Dropping a write handle without committing discards
//!    the staged mutations.
//! 2. Commit is atomic at the handle-close boundary, not per edge -- a
//!    caller must apply every edge of its unit of work before committing.
//! 3. Opening a second concurrent write handle is a hard error
//!    ([`StoreError::WriterConflict`]), never a silent wait.
//! 4. Store-native queries ([`StoreHandle::select`]) carry an
//!    operation-level timeout; exceeding it is an error, never a partial
//!    result.

pub mod edge;
pub mod error;
pub mod memory;
pub mod traits;

pub use edge::{Edge, Node};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryGraphStore;
pub use traits::{AccessMode, GraphStore, StoreHandle};
