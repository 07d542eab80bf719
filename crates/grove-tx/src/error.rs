use grove_store::StoreError;

/// Errors from transaction execution.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// Store failure inside the transaction.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The writer lane's worker has shut down and accepts no more work.
    #[error("writer lane is closed")]
    LaneClosed,

    /// The submitted closure panicked; staged work was discarded.
    #[error("transaction aborted by panic")]
    Aborted,

    /// Application-level failure carried through the lane.
    #[error("{0}")]
    Failed(String),
}

impl TxError {
    /// Wrap an application failure message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result alias for transaction operations.
pub type TxResult<T> = Result<T, TxError>;
