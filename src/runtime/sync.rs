use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Reentrant mutual exclusion keyed to the acquiring thread. The same
/// worker may acquire the lock repeatedly without blocking itself; other
/// workers block until the depth returns to zero. Acquire and release are
/// separate statements in the language, so this cannot be a guard-based
/// mutex.
#[derive(Default)]
pub struct ReentrantLock {
    state: Mutex<LockState>,
    available: Condvar,
}

#[derive(Default)]
struct LockState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl ReentrantLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks indefinitely until ownership is available; no timeout.
    pub fn acquire(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner == Some(me) {
            state.depth += 1;
            return;
        }
        while state.owner.is_some() {
            self.available.wait(&mut state);
        }
        state.owner = Some(me);
        state.depth = 1;
    }

    /// Returns false when the calling thread does not hold the lock.
    pub fn release(&self) -> bool {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            return false;
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.available.notify_one();
        }
        true
    }

    pub fn is_held(&self) -> bool {
        self.state.lock().owner.is_some()
    }
}

/// Name -> lock registry. Locks are created lazily on first reference and
/// retained for the lifetime of the run.
#[derive(Clone, Default)]
pub struct LockTable {
    locks: Arc<Mutex<HashMap<String, Arc<ReentrantLock>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Arc<ReentrantLock> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(ReentrantLock::new())),
        )
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentrant_acquire_does_not_self_block() {
        let lock = ReentrantLock::new();
        lock.acquire();
        lock.acquire();
        assert!(lock.is_held());
        assert!(lock.release());
        assert!(lock.is_held());
        assert!(lock.release());
        assert!(!lock.is_held());
    }

    #[test]
    fn release_without_ownership_fails() {
        let lock = ReentrantLock::new();
        assert!(!lock.release());
    }

    #[test]
    fn release_from_other_thread_fails() {
        let lock = Arc::new(ReentrantLock::new());
        lock.acquire();
        let other = Arc::clone(&lock);
        let released = thread::spawn(move || other.release()).join().unwrap();
        assert!(!released);
        assert!(lock.release());
    }

    #[test]
    fn blocked_thread_proceeds_after_release() {
        let lock = Arc::new(ReentrantLock::new());
        lock.acquire();
        let contender = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.acquire();
                lock.release()
            })
        };
        assert!(lock.release());
        assert!(contender.join().unwrap());
    }

    #[test]
    fn table_returns_the_same_lock_per_name() {
        let table = LockTable::new();
        let a = table.get("a");
        let again = table.get("a");
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(table.len(), 1);
        table.get("b");
        assert_eq!(table.len(), 2);
    }
}
