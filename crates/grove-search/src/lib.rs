//! Boolean search over a grove store.
//!
//! A [`SearchQuery`] is an ordered sequence of elements -- comparison
//! pairs, nested groups and logical connectives -- evaluated left to
//! right against the store. Partial results are combined with
//! cardinality-map set algebra so duplicate handling stays well-defined,
//! and an optional sort key rides through the algebra behind a private
//! token instead of making the set operations sort-aware.
//!
//! Every query is additionally constrained by a [`SecurityFilter`]
//! derived from the caller's grants and the target's lifecycle status;
//! access control composes with user-authored query trees instead of
//! post-filtering fetched objects.

pub mod algebra;
pub mod composer;
pub mod error;
pub mod model;
pub mod security;

pub use composer::{QueryComposer, SearchConfig, SearchScope};
pub use error::{ComposerResult, SearchError};
pub use model::{
    LogicalRelation, SearchElement, SearchPair, SearchQuery, SearchResult, SortCriterion,
    SortOrder,
};
pub use security::{SecurityFilter, TargetKind};
