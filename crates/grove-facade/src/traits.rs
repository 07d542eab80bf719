//! External collaborator boundaries, injected into the facade.

use grove_mapper::MappedObject;
use grove_types::{GrantRight, ResourceId, User};

/// Which operation a validation run precedes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationMethod {
    Create,
    Update,
    Delete,
}

/// Declarative business-rule validation, keyed by the object's type.
///
/// Implementations collect every violation instead of stopping at the
/// first.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        object: &dyn MappedObject,
        method: ValidationMethod,
    ) -> Result<(), Vec<String>>;
}

/// Validator that accepts everything. Default for embeddings without a
/// rule catalog.
pub struct AcceptAllValidator;

impl Validator for AcceptAllValidator {
    fn validate(&self, _: &dyn MappedObject, _: ValidationMethod) -> Result<(), Vec<String>> {
        Ok(())
    }
}

/// Grant evaluation: may `user` apply `right` to `target`?
///
/// The facade owns only this call site; grant storage and group
/// resolution live with the implementor.
pub trait GrantChecker: Send + Sync {
    fn allowed(&self, user: Option<&User>, target: &ResourceId, right: GrantRight) -> bool;
}

/// Checker backed by the grants the [`User`] itself carries.
pub struct GrantTableChecker;

impl GrantChecker for GrantTableChecker {
    fn allowed(&self, user: Option<&User>, target: &ResourceId, right: GrantRight) -> bool {
        user.is_some_and(|u| u.holds(right, target))
    }
}

/// The secondary search index.
///
/// Called fire-and-forget after a successful commit; failures are
/// logged, never propagated, and reconciled by out-of-band re-indexing.
pub trait SearchIndexer: Send + Sync {
    fn index_batch(&self, ids: &[ResourceId]) -> Result<(), String>;
    fn delete_batch(&self, ids: &[ResourceId]) -> Result<(), String>;
}

/// Indexer that drops every notification.
pub struct NoopIndexer;

impl SearchIndexer for NoopIndexer {
    fn index_batch(&self, _: &[ResourceId]) -> Result<(), String> {
        Ok(())
    }

    fn delete_batch(&self, _: &[ResourceId]) -> Result<(), String> {
        Ok(())
    }
}
