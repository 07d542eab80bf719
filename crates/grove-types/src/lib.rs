//! Foundation types for grove.
//!
//! This crate provides the identity, value, lifecycle, and authorization
//! types used throughout the grove system. Every other grove crate depends
//! on `grove-types`.
//!
//! # Key Types
//!
//! - [`ResourceId`] — URI identity of a graph resource, with optional
//!   `@pos<N>` list-position suffix
//! - [`Value`] — typed literal carried on a graph edge
//! - [`Status`] — lifecycle status gating public visibility
//! - [`User`] / [`Grant`] — authorization subjects and their rights

pub mod error;
pub mod id;
pub mod status;
pub mod terms;
pub mod user;
pub mod value;

pub use error::TypeError;
pub use id::ResourceId;
pub use status::Status;
pub use user::{Grant, GrantRight, User};
pub use value::{SearchOperator, Value, ValueKind};
