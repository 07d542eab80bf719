use grove_store::StoreError;

/// Errors from query evaluation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Store failure while evaluating a query, including exceeding the
    /// configured query timeout.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for composer operations.
pub type ComposerResult<T> = Result<T, SearchError>;
