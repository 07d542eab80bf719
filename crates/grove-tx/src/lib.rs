//! Transaction lifecycle for grove.
//!
//! All mutations of a store flow through a [`WriterLane`]: a dedicated
//! worker thread owning the store's single write handle at a time.
//! Callers submit closures and block for the outcome; failures raised
//! inside the lane, panics included, are re-raised on the calling thread
//! as errors. Reads never enter the lane and run concurrently on the
//! caller's thread via [`read_transaction`].

pub mod error;
pub mod lane;
pub mod transaction;

pub use error::{TxError, TxResult};
pub use lane::WriterLane;
pub use transaction::{read_transaction, Transaction, TxKind, TxState};
