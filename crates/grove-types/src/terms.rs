//! Well-known predicate and scope URIs shared across the grove crates.

/// Default base URI under which grove mints identities.
pub const BASE_URI: &str = "http://grove.org";

/// Predicate linking a resource to its declared graph type.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Predicate carrying a resource's lifecycle status.
pub const STATUS: &str = "http://grove.org/terms/status";

/// Predicate linking an item to its owning container.
pub const CONTAINER: &str = "http://grove.org/terms/container";

/// Grant target marking system-wide administrative rights.
pub const ADMIN_SCOPE: &str = "http://grove.org/scope/admin";
