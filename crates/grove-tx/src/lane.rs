use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use grove_store::{AccessMode, GraphStore, StoreHandle};
use tracing::{debug, error, info};

use crate::error::{TxError, TxResult};
use crate::transaction::{Transaction, TxKind};

type Job = Box<dyn FnOnce(&dyn GraphStore) + Send>;

/// The single-writer lane.
///
/// One worker thread drains a queue of write jobs; each job opens the
/// store's write handle, runs its closure, and commits on success or
/// discards the staged work on failure. Because the lane is the only
/// place write handles are opened, writers can never conflict no matter
/// how many threads submit concurrently.
///
/// [`Self::execute`] blocks the submitting thread until its job finishes
/// and re-raises the job's outcome there, so error handling reads like a
/// direct call. A panic inside a job is caught, surfaces as
/// [`TxError::Aborted`] on the submitter, and leaves the lane serving
/// subsequent jobs.
pub struct WriterLane {
    sender: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl WriterLane {
    /// Spawn the worker over `store`.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker = thread::spawn(move || {
            info!("writer lane started");
            for job in receiver {
                job(store.as_ref());
            }
            info!("writer lane stopped");
        });
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Submit a write job and block until it completes on the lane.
    ///
    /// The closure receives the open write handle; returning `Ok` commits
    /// the staged mutations, returning `Err` (or panicking) discards them.
    pub fn execute<R, F>(&self, f: F) -> TxResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn StoreHandle) -> TxResult<R> + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(TxError::LaneClosed)?;
        let (reply, outcome) = mpsc::channel::<TxResult<R>>();

        let job: Job = Box::new(move |store| {
            let mut tx = Transaction::new(TxKind::Write);
            tx.begin();
            debug!(tx = tx.id(), "write transaction running");
            let result = match catch_unwind(AssertUnwindSafe(|| run_write(store, f))) {
                Ok(result) => result,
                Err(_) => {
                    error!(tx = tx.id(), "write transaction panicked");
                    Err(TxError::Aborted)
                }
            };
            match &result {
                Ok(_) => {
                    tx.complete();
                    debug!(tx = tx.id(), elapsed_ms = tx.elapsed_ms(), "committed");
                }
                Err(err) => {
                    tx.fail();
                    error!(tx = tx.id(), %err, "write transaction failed");
                }
            }
            // The submitter may have given up waiting; its absence must
            // not take the lane down.
            let _ = reply.send(result);
        });

        sender.send(job).map_err(|_| TxError::LaneClosed)?;
        outcome.recv().map_err(|_| TxError::LaneClosed)?
    }

    /// Stop accepting jobs and wait for queued ones to finish.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("writer lane worker panicked during shutdown");
            }
        }
    }
}

impl Drop for WriterLane {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_write<R>(
    store: &dyn GraphStore,
    f: impl FnOnce(&mut dyn StoreHandle) -> TxResult<R>,
) -> TxResult<R> {
    let mut handle = store.open(AccessMode::Write)?;
    match f(handle.as_mut()) {
        Ok(value) => {
            handle.commit()?;
            Ok(value)
        }
        // Dropping the handle discards everything the closure staged.
        Err(err) => Err(err),
    }
}
