use grove_types::ResourceId;

/// Errors from graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested subject has no edges.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// A second concurrent write handle was requested.
    #[error("write handle already open: the store permits one writer process-wide")]
    WriterConflict,

    /// A mutating operation was issued on a read handle.
    #[error("handle is read-only")]
    ReadOnly,

    /// A store-native query exceeded its execution timeout.
    #[error("query exceeded its timeout of {timeout_ms}ms")]
    QueryTimeout { timeout_ms: u64 },

    /// The backing state is unreadable (e.g. a poisoned lock).
    #[error("store state corrupt: {0}")]
    Corrupt(String),

    /// Commit failed at the store level.
    #[error("commit failed: {0}")]
    CommitFailed(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
