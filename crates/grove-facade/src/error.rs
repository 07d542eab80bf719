use grove_mapper::MapperError;
use grove_store::StoreError;
use grove_tx::TxError;
use grove_types::ResourceId;

/// Errors from facade operations.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// One or more business-rule violations, all collected.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The operation requires a signed-in caller.
    #[error("authentication required")]
    Authentication,

    /// The caller is identified but lacks the required grant.
    #[error("not authorized for {id}")]
    Authorization { id: ResourceId },

    /// Another holder owns the edit lock.
    #[error("{key} is locked by {holder}")]
    Locked { key: String, holder: String },

    /// Mapping failure, including absent read/update/delete targets.
    #[error(transparent)]
    Mapper(#[from] MapperError),

    /// Store failure on the read path.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writer-lane failure, re-raised on the calling thread.
    #[error(transparent)]
    Tx(#[from] TxError),
}

/// Result alias for facade operations.
pub type FacadeResult<T> = Result<T, FacadeError>;
