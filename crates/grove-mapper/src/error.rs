use grove_store::StoreError;
use grove_types::{ResourceId, TypeError};

/// Errors from mapping objects to and from the graph.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// A write was attempted on an object without an identity.
    #[error("cannot map {type_segment} object: identity not assigned")]
    MissingIdentity { type_segment: String },

    /// The identity has no edges in the store.
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// A field name not present in the type's descriptor table.
    #[error("unknown field {field:?} on {type_segment}")]
    UnknownField {
        type_segment: String,
        field: String,
    },

    /// An embedded value carried an unexpected concrete type.
    #[error("embedded value has unexpected concrete type for field {field:?}")]
    EmbeddedType { field: String },

    /// A stored literal could not be hydrated to its declared kind.
    #[error(transparent)]
    Literal(#[from] TypeError),

    /// Store failure during mapping.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A nested mapping failure, wrapped with the offending field and
    /// subject so partial-write causes are traceable.
    #[error("mapping field {field:?} of {subject}: {source}")]
    Field {
        field: String,
        subject: String,
        #[source]
        source: Box<MapperError>,
    },
}

impl MapperError {
    /// Wrap an error with field/subject context.
    pub fn in_field(self, field: &str, subject: &ResourceId) -> Self {
        Self::Field {
            field: field.to_string(),
            subject: subject.as_str().to_string(),
            source: Box::new(self),
        }
    }
}

/// Result alias for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;
