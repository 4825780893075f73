use crate::communication::peers::AppendEntriesRequest;

pub mod append_entries_processor;
pub mod append_entries_sender;
pub mod peer_log_replicator;

/// Parameters of a sent AppendEntries request needed to interpret its response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "term {} prev index {} entries {}",
    term,
    prev_log_index,
    entry_count
)]
pub struct AppendEntriesRequestInfo {
    pub term: u64,
    pub prev_log_index: u64,
    pub entry_count: u64,
}

impl From<&AppendEntriesRequest> for AppendEntriesRequestInfo {
    fn from(request: &AppendEntriesRequest) -> Self {
        AppendEntriesRequestInfo {
            term: request.term,
            prev_log_index: request.prev_log_index,
            entry_count: request.entries.len() as u64,
        }
    }
}
