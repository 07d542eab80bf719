use serde::{Deserialize, Serialize};

use grove_types::{ResourceId, Value};

/// The object position of an edge: a typed literal or a link to another
/// resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Literal(Value),
    Resource(ResourceId),
}

impl Node {
    /// The linked resource, if this node is one.
    pub fn as_resource(&self) -> Option<&ResourceId> {
        match self {
            Self::Resource(id) => Some(id),
            Self::Literal(_) => None,
        }
    }

    /// The literal value, if this node is one.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Resource(_) => None,
        }
    }
}

/// One `(subject, predicate, object)` triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub subject: ResourceId,
    pub predicate: String,
    pub object: Node,
}

impl Edge {
    pub fn literal(subject: ResourceId, predicate: impl Into<String>, value: Value) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: Node::Literal(value),
        }
    }

    pub fn link(subject: ResourceId, predicate: impl Into<String>, target: ResourceId) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: Node::Resource(target),
        }
    }
}
