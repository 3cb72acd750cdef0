//! Worker registry for the run's thread-per-statement model.
//!
//! A worker moves through Ready -> Running -> (Blocked on receive or lock)
//! -> Running -> Terminated; the blocking happens inside the channel and
//! lock primitives. The registry is append-only for the duration of a run
//! and joined exactly once, at the very end of top-level execution — not
//! at the end of the block that spawned a worker.

use crate::runtime::error::RuntimeResult;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Clone, Default)]
pub struct WorkerRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    handles: Mutex<Vec<JoinHandle<()>>>,
    outcomes: Mutex<Vec<RuntimeResult<()>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on a new OS thread. A failure is logged and captured in the
    /// outcome list; it is never re-raised to the spawning worker.
    pub fn spawn<F>(&self, f: F)
    where
        F: FnOnce() -> RuntimeResult<()> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let handle = thread::spawn(move || {
            let result = f();
            if let Err(err) = &result {
                tracing::warn!(error = %err, "worker failed");
            }
            inner.outcomes.lock().push(result);
        });
        self.inner.handles.lock().push(handle);
    }

    /// Join every registered worker, including workers registered while
    /// joining (transitive spawns). Blocks without timeout; a hung worker
    /// hangs the whole run.
    pub fn join_all(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = {
                let mut handles = self.inner.handles.lock();
                if handles.is_empty() {
                    break;
                }
                handles.drain(..).collect()
            };
            for handle in drained {
                let _ = handle.join();
            }
        }
    }

    /// Captured per-worker outcomes, retained for optional inspection.
    /// Meaningful after `join_all`.
    pub fn outcomes(&self) -> Vec<RuntimeResult<()>> {
        self.inner.outcomes.lock().clone()
    }
}
