use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Marker separating a list-element identity from its position.
pub const POSITION_MARKER: &str = "@pos";

/// URI identity of a graph resource.
///
/// A `ResourceId` follows the form `<base-uri>/<type-segment>/<opaque-id>`.
/// List-element identities additionally carry a `/<child-segment>@pos<N>`
/// suffix; the suffix is the only part of an identity that is ever
/// rewritten (when a list is re-ordered), the base is immutable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId {
    uri: String,
}

impl ResourceId {
    /// Build an identity from its three parts.
    pub fn new(base: &str, segment: &str, opaque: &str) -> Result<Self, TypeError> {
        if segment.is_empty() || opaque.is_empty() {
            return Err(TypeError::InvalidId {
                uri: format!("{base}/{segment}/{opaque}"),
                reason: "empty segment".into(),
            });
        }
        let base = base.trim_end_matches('/');
        Self::parse(&format!("{base}/{segment}/{opaque}"))
    }

    /// Mint a new identity with a random opaque part.
    pub fn generate(base: &str, segment: &str) -> Self {
        let opaque = uuid::Uuid::new_v4().simple().to_string();
        // The uuid opaque part cannot produce an invalid uri.
        Self::new(base, segment, &opaque).expect("generated id is valid")
    }

    /// Parse and validate a URI as a resource identity.
    pub fn parse(uri: &str) -> Result<Self, TypeError> {
        if uri.is_empty() {
            return Err(TypeError::InvalidId {
                uri: uri.into(),
                reason: "empty".into(),
            });
        }
        if uri.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidId {
                uri: uri.into(),
                reason: "contains whitespace".into(),
            });
        }
        match uri.matches(POSITION_MARKER).count() {
            0 => {}
            1 => {
                let tail = uri
                    .rsplit(POSITION_MARKER)
                    .next()
                    .unwrap_or_default();
                if tail.parse::<usize>().is_err() {
                    return Err(TypeError::InvalidId {
                        uri: uri.into(),
                        reason: "malformed position suffix".into(),
                    });
                }
            }
            _ => {
                return Err(TypeError::InvalidId {
                    uri: uri.into(),
                    reason: "multiple position markers".into(),
                });
            }
        }
        Ok(Self { uri: uri.into() })
    }

    /// The full URI.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// The list position encoded in the identity, if any.
    pub fn position(&self) -> Option<usize> {
        let (_, tail) = self.uri.split_once(POSITION_MARKER)?;
        tail.parse().ok()
    }

    /// The URI with any position suffix removed.
    pub fn without_position(&self) -> &str {
        match self.uri.split_once(POSITION_MARKER) {
            Some((head, _)) => head,
            None => &self.uri,
        }
    }

    /// Rewrite the position suffix, reusing the existing base.
    ///
    /// Identities without a position suffix get one appended, so that after
    /// every list write each element carries its current position.
    pub fn with_position(&self, pos: usize) -> Self {
        Self {
            uri: format!("{}{}{}", self.without_position(), POSITION_MARKER, pos),
        }
    }

    /// Derive a list-element identity from this (parent) identity.
    pub fn child(&self, child_segment: &str, pos: usize) -> Self {
        Self {
            uri: format!("{}/{}{}{}", self.uri, child_segment, POSITION_MARKER, pos),
        }
    }

    /// The type segment of the identity (second-to-last path component).
    pub fn type_segment(&self) -> &str {
        let head = self.without_position();
        let mut parts = head.rsplit('/');
        parts.next();
        parts.next().unwrap_or_default()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.uri)
    }
}

impl FromStr for ResourceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
