//! In-memory graph store for tests and embedding.
//!
//! [`MemoryGraphStore`] keeps all edges in a `BTreeMap` keyed by subject,
//! behind a `RwLock`. Write handles stage a full copy of the edge set and
//! swap it in on commit, which makes commit atomic at the handle-close
//! boundary exactly as the store contract requires. The store counts open
//! write handles so tests can verify the single-writer discipline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use grove_types::{ResourceId, SearchOperator, Value};

use crate::edge::{Edge, Node};
use crate::error::{StoreError, StoreResult};
use crate::traits::{AccessMode, GraphStore, StoreHandle};

/// Outgoing edges per subject, in insertion order.
type EdgeSet = BTreeMap<String, Vec<Edge>>;

struct StoreState {
    edges: RwLock<EdgeSet>,
    open_writers: AtomicUsize,
    max_concurrent_writers: AtomicUsize,
}

/// An in-memory implementation of [`GraphStore`].
///
/// Data is lost when the store is dropped. Suitable for unit tests and
/// short-lived embedding.
pub struct MemoryGraphStore {
    state: Arc<StoreState>,
}

impl MemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(StoreState {
                edges: RwLock::new(BTreeMap::new()),
                open_writers: AtomicUsize::new(0),
                max_concurrent_writers: AtomicUsize::new(0),
            }),
        }
    }

    /// Total number of committed edges.
    pub fn edge_count(&self) -> usize {
        self.state
            .edges
            .read()
            .map(|e| e.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// High-water mark of concurrently open write handles.
    ///
    /// Under the single-writer discipline this gauge never exceeds 1.
    pub fn max_concurrent_writers(&self) -> usize {
        self.state.max_concurrent_writers.load(Ordering::SeqCst)
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore for MemoryGraphStore {
    fn open(&self, mode: AccessMode) -> StoreResult<Box<dyn StoreHandle>> {
        match mode {
            AccessMode::Read => Ok(Box::new(ReadHandle {
                state: Arc::clone(&self.state),
            })),
            AccessMode::Write => {
                // Claim the writer slot; a second concurrent writer is a
                // caller bug surfaced as WriterConflict.
                if self
                    .state
                    .open_writers
                    .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return Err(StoreError::WriterConflict);
                }
                self.state
                    .max_concurrent_writers
                    .fetch_max(1, Ordering::SeqCst);
                let staged = self
                    .state
                    .edges
                    .read()
                    .map_err(|e| StoreError::Corrupt(format!("lock poisoned: {e}")))?
                    .clone();
                debug!("write handle opened");
                Ok(Box::new(WriteHandle {
                    state: Arc::clone(&self.state),
                    staged,
                    open: true,
                }))
            }
        }
    }
}

impl std::fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGraphStore")
            .field("edge_count", &self.edge_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Shared read-side evaluation over an edge set
// ---------------------------------------------------------------------------

fn edges_of(set: &EdgeSet, subject: &ResourceId) -> Vec<Edge> {
    set.get(subject.as_str()).cloned().unwrap_or_default()
}

fn object_of(set: &EdgeSet, subject: &ResourceId, predicate: &str) -> Option<Node> {
    set.get(subject.as_str())?
        .iter()
        .find(|e| e.predicate == predicate)
        .map(|e| e.object.clone())
}

fn select(
    set: &EdgeSet,
    predicate: &str,
    op: SearchOperator,
    probe: &Value,
    negated: bool,
    timeout: Duration,
) -> StoreResult<Vec<ResourceId>> {
    let started = Instant::now();
    let mut hits = Vec::new();
    for edges in set.values() {
        if started.elapsed() >= timeout {
            return Err(StoreError::QueryTimeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        let matched = edges.iter().any(|e| {
            e.predicate == predicate
                && match &e.object {
                    Node::Literal(v) => v.matches(op, probe),
                    Node::Resource(id) => {
                        Value::Uri(id.as_str().to_string()).matches(op, probe)
                    }
                }
        });
        if matched != negated {
            if let Some(first) = edges.first() {
                hits.push(first.subject.clone());
            }
        }
    }
    Ok(hits)
}

fn subjects(set: &EdgeSet) -> Vec<ResourceId> {
    set.values()
        .filter_map(|edges| edges.first().map(|e| e.subject.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Read handle
// ---------------------------------------------------------------------------

struct ReadHandle {
    state: Arc<StoreState>,
}

impl ReadHandle {
    fn with_set<R>(&self, f: impl FnOnce(&EdgeSet) -> R) -> StoreResult<R> {
        let set = self
            .state
            .edges
            .read()
            .map_err(|e| StoreError::Corrupt(format!("lock poisoned: {e}")))?;
        Ok(f(&set))
    }
}

impl StoreHandle for ReadHandle {
    fn add(&mut self, _edge: Edge) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn remove_subject(&mut self, _subject: &ResourceId) -> StoreResult<usize> {
        Err(StoreError::ReadOnly)
    }

    fn remove_edges(&mut self, _subject: &ResourceId, _predicate: &str) -> StoreResult<usize> {
        Err(StoreError::ReadOnly)
    }

    fn edges_of(&self, subject: &ResourceId) -> StoreResult<Vec<Edge>> {
        self.with_set(|set| edges_of(set, subject))
    }

    fn object_of(&self, subject: &ResourceId, predicate: &str) -> StoreResult<Option<Node>> {
        self.with_set(|set| object_of(set, subject, predicate))
    }

    fn contains(&self, subject: &ResourceId) -> StoreResult<bool> {
        self.with_set(|set| set.contains_key(subject.as_str()))
    }

    fn select(
        &self,
        predicate: &str,
        op: SearchOperator,
        probe: &Value,
        negated: bool,
        timeout: Duration,
    ) -> StoreResult<Vec<ResourceId>> {
        self.with_set(|set| select(set, predicate, op, probe, negated, timeout))?
    }

    fn subjects(&self) -> StoreResult<Vec<ResourceId>> {
        self.with_set(subjects)
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write handle
// ---------------------------------------------------------------------------

struct WriteHandle {
    state: Arc<StoreState>,
    staged: EdgeSet,
    open: bool,
}

impl StoreHandle for WriteHandle {
    fn add(&mut self, edge: Edge) -> StoreResult<()> {
        let edges = self.staged.entry(edge.subject.as_str().to_string()).or_default();
        // Set semantics: re-adding an identical triple is a no-op.
        if !edges.contains(&edge) {
            edges.push(edge);
        }
        Ok(())
    }

    fn remove_subject(&mut self, subject: &ResourceId) -> StoreResult<usize> {
        Ok(self
            .staged
            .remove(subject.as_str())
            .map(|edges| edges.len())
            .unwrap_or(0))
    }

    fn remove_edges(&mut self, subject: &ResourceId, predicate: &str) -> StoreResult<usize> {
        let Some(edges) = self.staged.get_mut(subject.as_str()) else {
            return Ok(0);
        };
        let before = edges.len();
        edges.retain(|e| e.predicate != predicate);
        let removed = before - edges.len();
        if edges.is_empty() {
            self.staged.remove(subject.as_str());
        }
        Ok(removed)
    }

    fn edges_of(&self, subject: &ResourceId) -> StoreResult<Vec<Edge>> {
        Ok(edges_of(&self.staged, subject))
    }

    fn object_of(&self, subject: &ResourceId, predicate: &str) -> StoreResult<Option<Node>> {
        Ok(object_of(&self.staged, subject, predicate))
    }

    fn contains(&self, subject: &ResourceId) -> StoreResult<bool> {
        Ok(self.staged.contains_key(subject.as_str()))
    }

    fn select(
        &self,
        predicate: &str,
        op: SearchOperator,
        probe: &Value,
        negated: bool,
        timeout: Duration,
    ) -> StoreResult<Vec<ResourceId>> {
        select(&self.staged, predicate, op, probe, negated, timeout)
    }

    fn subjects(&self) -> StoreResult<Vec<ResourceId>> {
        Ok(subjects(&self.staged))
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        let mut committed = self
            .state
            .edges
            .write()
            .map_err(|e| StoreError::CommitFailed(format!("lock poisoned: {e}")))?;
        *committed = std::mem::take(&mut self.staged);
        drop(committed);
        self.release();
        debug!("write handle committed");
        Ok(())
    }
}

impl WriteHandle {
    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.state.open_writers.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        // Dropping without commit discards the staged mutations.
        self.release();
    }
}
