pub mod updater;

use crate::errors::RaftError;
use crate::operation_log::LogEntry;

/// Provides Raft operations with the underlying replicated state machine.
pub trait ReplicatedStateMachine: Send + 'static {
    /// Apply committed operation log entry to the state machine.
    /// Called once per entry, in the log order.
    fn apply_entry(&mut self, entry: &LogEntry) -> Result<(), RaftError>;
}
