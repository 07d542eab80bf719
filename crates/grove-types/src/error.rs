/// Errors from parsing or constructing foundation types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A resource identity could not be parsed.
    #[error("invalid resource id {uri:?}: {reason}")]
    InvalidId { uri: String, reason: String },

    /// A literal could not be parsed into its typed representation.
    #[error("cannot parse {text:?} as {kind}")]
    InvalidLiteral { kind: String, text: String },

    /// An unknown lifecycle status URI.
    #[error("unknown status uri: {0}")]
    UnknownStatus(String),
}

/// Result alias for foundation type operations.
pub type TypeResult<T> = Result<T, TypeError>;
