use parking_lot::Mutex;
use raft::{LogEntry, RaftError, ReplicatedStateMachine};
use std::sync::Arc;

/// Recording state machine. Clones share the applied entries, so a test keeps
/// a handle while the node owns the other one.
#[derive(Debug, Clone, Default)]
pub struct MemoryRsm {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryRsm {
    pub fn new() -> MemoryRsm {
        MemoryRsm::default()
    }

    /// Applied commands in the application order.
    pub fn applied_data(&self) -> Vec<Vec<u8>> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.data.clone())
            .collect()
    }

    /// Full applied entries clone for the checks.
    pub fn applied_entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn last_applied_index(&self) -> u64 {
        self.entries.lock().last().map(|entry| entry.index).unwrap_or(0)
    }
}

impl ReplicatedStateMachine for MemoryRsm {
    fn apply_entry(&mut self, entry: &LogEntry) -> Result<(), RaftError> {
        let mut entries = self.entries.lock();
        let last_applied_index = entries.last().map(|entry| entry.index).unwrap_or(0);

        // a restarted node replays the committed prefix
        if entry.index <= last_applied_index {
            warn!("Attempted to apply entry with existing index={}", entry.index);
            return Ok(());
        }

        if entry.index != last_applied_index + 1 {
            return raft::new_err(
                format!(
                    "Rsm: entry {} applied after {}",
                    entry.index, last_applied_index
                ),
                String::new(),
            );
        }

        trace!("Rsm applied entry: {}", entry.index);
        entries.push(entry.clone());

        Ok(())
    }
}
