use parking_lot::Mutex;
use raft::{new_err, PersistentState, PersistentStore, RaftError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct StoreInner {
    state: Mutex<PersistentState>,
    fail_writes: AtomicBool,
    save_count: AtomicU64,
}

/// In-memory persistent store. Clones share the saved state, so it survives a node
/// restart within the process. Writes can be made to fail.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistentStore {
    inner: Arc<StoreInner>,
}

impl MemoryPersistentStore {
    pub fn new() -> MemoryPersistentStore {
        MemoryPersistentStore::default()
    }

    /// Makes the following saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail_writes: bool) {
        self.inner.fail_writes.store(fail_writes, Ordering::SeqCst);
    }

    /// Copy of the last saved state.
    pub fn saved_state(&self) -> PersistentState {
        self.inner.state.lock().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.inner.save_count.load(Ordering::SeqCst)
    }
}

impl PersistentStore for MemoryPersistentStore {
    fn save_state(&self, state: &PersistentState) -> Result<(), RaftError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return new_err("Memory store write failed".to_string(), "fault injected".to_string());
        }

        *self.inner.state.lock() = state.clone();
        self.inner.save_count.fetch_add(1, Ordering::SeqCst);
        trace!("Node state saved: {}", state);

        Ok(())
    }

    fn load_state(&self) -> Result<PersistentState, RaftError> {
        Ok(self.inner.state.lock().clone())
    }
}
