use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use grove_store::{AccessMode, GraphStore, StoreHandle};

use crate::error::TxResult;

static NEXT_TX_ID: AtomicU64 = AtomicU64::new(1);

/// Whether a transaction mutates the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxKind {
    Read,
    Write,
}

/// Lifecycle state of a transaction. Transitions are strictly forward:
/// `Pending -> Running -> Committed | Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxState {
    Pending,
    Running,
    Committed,
    Failed,
}

/// Bookkeeping record for one transaction, used by the writer lane for
/// logging and by tests to observe lifecycle transitions.
#[derive(Debug)]
pub struct Transaction {
    id: u64,
    kind: TxKind,
    state: TxState,
    started: Instant,
}

impl Transaction {
    pub fn new(kind: TxKind) -> Self {
        Self {
            id: NEXT_TX_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            state: TxState::Pending,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Milliseconds since the transaction was created.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn begin(&mut self) {
        debug_assert_eq!(self.state, TxState::Pending);
        self.state = TxState::Running;
    }

    pub fn complete(&mut self) {
        debug_assert_eq!(self.state, TxState::Running);
        self.state = TxState::Committed;
    }

    pub fn fail(&mut self) {
        self.state = TxState::Failed;
    }
}

/// Run a read-only transaction on the caller's thread.
///
/// Reads observe only committed state and never contend with the writer
/// lane, so any number may run concurrently.
pub fn read_transaction<R>(
    store: &dyn GraphStore,
    f: impl FnOnce(&dyn StoreHandle) -> TxResult<R>,
) -> TxResult<R> {
    let handle = store.open(AccessMode::Read)?;
    f(handle.as_ref())
}
