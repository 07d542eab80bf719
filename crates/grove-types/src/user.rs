use serde::{Deserialize, Serialize};

use crate::id::ResourceId;
use crate::terms;

/// A right a [`Grant`] confers over its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantRight {
    Create,
    Read,
    Update,
    Delete,
    /// Administrative scope over the target; implies every other right.
    Admin,
}

/// An authorization record binding a right to a target resource.
///
/// Grants are the sole source of authorization; there is no separate
/// ACL store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub right: GrantRight,
    pub target: ResourceId,
}

impl Grant {
    pub fn new(right: GrantRight, target: ResourceId) -> Self {
        Self { right, target }
    }

    /// The system-wide administrative grant.
    pub fn sys_admin() -> Self {
        Self {
            right: GrantRight::Admin,
            // The admin scope constant is a valid uri by construction.
            target: ResourceId::parse(terms::ADMIN_SCOPE).expect("admin scope uri"),
        }
    }

    /// Whether this grant confers `right` over `target`.
    pub fn covers(&self, right: GrantRight, target: &ResourceId) -> bool {
        if self.target.as_str() == terms::ADMIN_SCOPE {
            return true;
        }
        self.target == *target && (self.right == right || self.right == GrantRight::Admin)
    }
}

/// An authenticated caller and the grants it holds.
///
/// Anonymous callers are represented as `Option<&User>` = `None` at the
/// facade and search boundaries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    pub email: String,
    pub grants: Vec<Grant>,
}

impl User {
    pub fn new(id: ResourceId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            grants: Vec::new(),
        }
    }

    /// Append a grant, builder-style.
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant);
        self
    }

    /// Whether this user holds the system-wide administrative scope.
    pub fn is_sys_admin(&self) -> bool {
        self.grants
            .iter()
            .any(|g| g.right == GrantRight::Admin && g.target.as_str() == terms::ADMIN_SCOPE)
    }

    /// Whether this user holds `right` over `target`.
    pub fn holds(&self, right: GrantRight, target: &ResourceId) -> bool {
        self.grants.iter().any(|g| g.covers(right, target))
    }

    /// Grant targets whose type segment matches `segment`.
    ///
    /// Used by the security filter to collect the containers or items a
    /// user may see.
    pub fn granted_targets(&self, segment: &str) -> Vec<ResourceId> {
        self.grants
            .iter()
            .filter(|g| g.target.type_segment() == segment)
            .map(|g| g.target.clone())
            .collect()
    }
}
