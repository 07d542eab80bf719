use grove_store::{Node, StoreHandle};
use grove_types::{terms, GrantRight, ResourceId, Status, User, Value};
use tracing::debug;

use crate::error::ComposerResult;

/// What graph type a query targets, with the identity segments needed to
/// partition the caller's grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    /// Container-level objects: visibility follows grants on the
    /// container itself.
    Container { segment: &'static str },
    /// Item-level objects: visibility is the union of direct per-item
    /// grants and grants on the enclosing container.
    Item {
        segment: &'static str,
        container_segment: &'static str,
    },
}

impl TargetKind {
    /// The identity segment of the targeted type.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Container { segment } | Self::Item { segment, .. } => segment,
        }
    }
}

/// The visibility decision derived from grants and status.
#[derive(Clone, Debug, PartialEq)]
enum Access {
    /// No candidate passes.
    DenyAll,
    /// Only released or withdrawn candidates pass.
    PublicOnly,
    /// Every candidate passes; the query's own status constraint (if
    /// any) is the only gate.
    Unrestricted,
    /// Public candidates plus those covered by the caller's grants.
    Scoped {
        containers: Vec<ResourceId>,
        items: Vec<ResourceId>,
        include_public: bool,
    },
}

/// The per-query access constraint, merged by AND into every store query
/// the composer issues.
///
/// Built once per search from the caller's grants and the queried
/// lifecycle status; applied as a candidate predicate over the stored
/// status and container edges.
#[derive(Clone, Debug, PartialEq)]
pub struct SecurityFilter {
    access: Access,
}

impl SecurityFilter {
    /// Derive the filter for one query.
    ///
    /// Released and withdrawn objects are globally visible on status
    /// alone. Pending objects need an explicit grant on the object or
    /// its container, or an administrative scope; anonymous and
    /// grantless callers collapse to an empty result.
    pub fn build(user: Option<&User>, kind: &TargetKind, status: Option<Status>) -> Self {
        let access = match status {
            // The query already pins a globally visible status.
            Some(s) if s.is_public() => Access::Unrestricted,
            _ => match user {
                Some(u) if u.is_sys_admin() => Access::Unrestricted,
                Some(u) if !u.grants.is_empty() => {
                    let (containers, items) = match kind {
                        TargetKind::Container { segment } => {
                            (u.granted_targets(segment), Vec::new())
                        }
                        TargetKind::Item {
                            segment,
                            container_segment,
                        } => (u.granted_targets(container_segment), u.granted_targets(segment)),
                    };
                    if containers.is_empty() && items.is_empty() {
                        Self::grantless(status)
                    } else {
                        Access::Scoped {
                            containers,
                            items,
                            include_public: status != Some(Status::Pending),
                        }
                    }
                }
                // Anonymous, or authenticated without any grant.
                _ => Self::grantless(status),
            },
        };
        debug!(?access, "security filter built");
        Self { access }
    }

    fn grantless(status: Option<Status>) -> Access {
        if status == Some(Status::Pending) {
            Access::DenyAll
        } else {
            Access::PublicOnly
        }
    }

    /// Whether no candidate can pass, letting the composer skip store
    /// queries entirely.
    pub fn is_deny_all(&self) -> bool {
        self.access == Access::DenyAll
    }

    /// Whether one candidate passes, consulting its stored status and
    /// container edges.
    pub fn allows(&self, handle: &dyn StoreHandle, id: &ResourceId) -> ComposerResult<bool> {
        match &self.access {
            Access::DenyAll => Ok(false),
            Access::Unrestricted => Ok(true),
            Access::PublicOnly => Ok(stored_status(handle, id)?.is_some_and(|s| s.is_public())),
            Access::Scoped {
                containers,
                items,
                include_public,
            } => {
                if *include_public
                    && stored_status(handle, id)?.is_some_and(|s| s.is_public())
                {
                    return Ok(true);
                }
                if items.iter().any(|t| t.as_str() == id.without_position()) {
                    return Ok(true);
                }
                // Containers cover themselves and their member items.
                if containers.iter().any(|t| t.as_str() == id.without_position()) {
                    return Ok(true);
                }
                if let Some(Node::Resource(container)) =
                    handle.object_of(id, terms::CONTAINER)?
                {
                    return Ok(containers.iter().any(|t| t == &container));
                }
                Ok(false)
            }
        }
    }
}

fn stored_status(handle: &dyn StoreHandle, id: &ResourceId) -> ComposerResult<Option<Status>> {
    match handle.object_of(id, terms::STATUS)? {
        // An unparseable stored status counts as not-public rather than
        // failing the whole query.
        Some(Node::Literal(Value::Uri(uri))) => Ok(Status::from_uri(&uri).ok()),
        _ => Ok(None),
    }
}
