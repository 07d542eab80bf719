use std::time::Duration;

use grove_types::{ResourceId, SearchOperator, Value};

use crate::edge::{Edge, Node};
use crate::error::StoreResult;

/// How a handle will be used. The store may serve any number of
/// concurrent `Read` handles but at most one `Write` handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// A triple graph store.
///
/// Implementations must satisfy these invariants:
/// - Read handles observe only committed state.
/// - Opening a `Write` handle while another is open fails with
///   `WriterConflict`; the single-writer discipline is the caller's job
///   (see the writer lane in `grove-tx`), the store only enforces it.
/// - All errors are propagated, never silently ignored.
pub trait GraphStore: Send + Sync {
    /// Open a handle onto the store.
    fn open(&self, mode: AccessMode) -> StoreResult<Box<dyn StoreHandle>>;
}

/// A short-lived handle onto the store, the unit of begin/commit/close.
///
/// Mutating methods fail with `ReadOnly` on a read handle. Mutations on a
/// write handle are staged and become visible only after [`Self::commit`];
/// dropping the handle instead discards them.
pub trait StoreHandle: Send {
    /// Stage one edge.
    fn add(&mut self, edge: Edge) -> StoreResult<()>;

    /// Remove every edge whose subject is `subject`. Returns the number
    /// of edges removed.
    fn remove_subject(&mut self, subject: &ResourceId) -> StoreResult<usize>;

    /// Remove the subject's edges for one predicate only.
    fn remove_edges(&mut self, subject: &ResourceId, predicate: &str) -> StoreResult<usize>;

    /// All edges of a subject, in insertion order. Empty if the subject
    /// is absent.
    fn edges_of(&self, subject: &ResourceId) -> StoreResult<Vec<Edge>>;

    /// The first object of `(subject, predicate, ?)`, if any.
    fn object_of(&self, subject: &ResourceId, predicate: &str) -> StoreResult<Option<Node>>;

    /// Whether the subject has at least one edge.
    fn contains(&self, subject: &ResourceId) -> StoreResult<bool>;

    /// Store-native query: subjects with an edge `(s, predicate, o)` where
    /// `o <op> probe` holds. With `negated`, subjects that have edges but
    /// no such match. `timeout` bounds execution; exceeding it is
    /// `QueryTimeout`, never a partial result.
    fn select(
        &self,
        predicate: &str,
        op: SearchOperator,
        probe: &Value,
        negated: bool,
        timeout: Duration,
    ) -> StoreResult<Vec<ResourceId>>;

    /// All subjects currently holding at least one edge, sorted.
    fn subjects(&self) -> StoreResult<Vec<ResourceId>>;

    /// Commit staged mutations atomically and close the handle.
    /// A no-op close for read handles.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}
