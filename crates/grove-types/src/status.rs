use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle status of a stored object.
///
/// `Released` and `Withdrawn` objects are publicly visible; their status
/// alone gates visibility. `Pending` objects are visible only through
/// explicit grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Released,
    Withdrawn,
}

impl Status {
    /// The URI stored as the object of the status predicate.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Pending => "http://grove.org/status#PENDING",
            Self::Released => "http://grove.org/status#RELEASED",
            Self::Withdrawn => "http://grove.org/status#WITHDRAWN",
        }
    }

    /// Parse a stored status URI.
    pub fn from_uri(uri: &str) -> Result<Self, TypeError> {
        match uri {
            "http://grove.org/status#PENDING" => Ok(Self::Pending),
            "http://grove.org/status#RELEASED" => Ok(Self::Released),
            "http://grove.org/status#WITHDRAWN" => Ok(Self::Withdrawn),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }

    /// Whether this status alone makes the object visible to everyone.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Released | Self::Withdrawn)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Released => "RELEASED",
            Self::Withdrawn => "WITHDRAWN",
        };
        f.write_str(name)
    }
}
