use serde::{Deserialize, Serialize};

use crate::errors::{new_err, Result};

pub mod replication;

/// Operation log entry. Immutable once appended.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "Entry: index {} term {} data size {}", index, term, "data.len()")]
pub struct LogEntry {
    /// 1-based position in the log.
    pub index: u64,

    /// Term of the leader that created the entry.
    pub term: u64,

    /// Command serialized in bytes format.
    pub data: Vec<u8>,
}

/// Append/truncate-only sequence of log entries. Index 0 is a sentinel with term 0.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    entries: Vec<LogEntry>,
}

impl OperationLog {
    pub fn new() -> OperationLog {
        OperationLog {
            entries: Vec::new(),
        }
    }

    pub fn get_last_entry_index(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn get_last_entry_term(&self) -> u64 {
        self.entries.last().map(|entry| entry.term).unwrap_or(0)
    }

    pub fn get_entry(&self, index: u64) -> Option<&LogEntry> {
        if index == 0 {
            return None;
        }
        self.entries.get((index - 1) as usize)
    }

    /// Term of the entry at the index. The sentinel (index 0) has term 0.
    pub fn get_term_at(&self, index: u64) -> Option<u64> {
        if index == 0 {
            return Some(0);
        }
        self.get_entry(index).map(|entry| entry.term)
    }

    /// Appends the command as a new entry and returns its index.
    pub fn append_new_entry(&mut self, term: u64, data: Vec<u8>) -> u64 {
        let index = self.get_last_entry_index() + 1;
        self.entries.push(LogEntry { index, term, data });

        index
    }

    /// Returns up to `max_count` entries starting with `start_index`.
    pub fn get_entries_from(&self, start_index: u64, max_count: usize) -> Vec<LogEntry> {
        let start = start_index.max(1);
        if start > self.get_last_entry_index() {
            return Vec::new();
        }

        self.entries[(start - 1) as usize..]
            .iter()
            .take(max_count)
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Merges entries received from the leader. Entries already present are skipped,
    /// a conflicting entry (same index, other term) is removed with all that follow it,
    /// new entries are appended. Returns true if the log changed.
    ///
    /// Entries must be contiguous and start no further than one past the last index.
    pub fn merge_entries(&mut self, new_entries: Vec<LogEntry>) -> Result<bool> {
        let mut changed = false;

        for entry in new_entries {
            let last_index = self.get_last_entry_index();
            if entry.index == 0 || entry.index > last_index + 1 {
                return new_err(
                    format!(
                        "Cannot merge entry with index {} into log with last index {}",
                        entry.index, last_index
                    ),
                    String::new(),
                );
            }

            if entry.index <= last_index {
                if self.get_term_at(entry.index) == Some(entry.term) {
                    continue;
                }

                trace!(
                    "Conflicting entry at index {}, log truncated from it",
                    entry.index
                );
                self.entries.truncate((entry.index - 1) as usize);
            }

            self.entries.push(entry);
            changed = true;
        }

        Ok(changed)
    }
}

impl std::fmt::Display for OperationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Log: last index {} last term {}",
            self.get_last_entry_index(),
            self.get_last_entry_term()
        )
    }
}
