//! Read/write facade for grove.
//!
//! [`ObjectFacade`] wraps every CRUD operation in the same sequence:
//! reject empty batches, validate (collecting every violation),
//! authorize against the caller's grants, run the mapper payload on the
//! writer lane, and finally notify the secondary search index without
//! waiting for it. The store commit is the source of truth; index
//! staleness is reconciled out of band.
//!
//! A coarser [`LockService`] guards higher-level editing workflows so
//! two users do not concurrently edit the same object through the
//! facade.

pub mod error;
pub mod facade;
pub mod locks;
pub mod traits;

pub use error::{FacadeError, FacadeResult};
pub use facade::ObjectFacade;
pub use locks::{LockConfig, LockService};
pub use traits::{
    AcceptAllValidator, GrantChecker, GrantTableChecker, NoopIndexer, SearchIndexer,
    ValidationMethod, Validator,
};
