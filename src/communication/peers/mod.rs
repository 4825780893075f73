use crossbeam_channel::Receiver;
use std::time::Duration;

use crate::communication::InboundRequest;
use crate::errors::RaftError;
use crate::operation_log::LogEntry;

/// RequestVote RPC request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Vote request: term {} candidate {} last log index {} last log term {}",
    term,
    candidate_id,
    last_log_index,
    last_log_term
)]
pub struct VoteRequest {
    /// Candidate's term.
    pub term: u64,

    /// Candidate requesting the vote.
    pub candidate_id: u64,

    /// Index of candidate's last log entry.
    pub last_log_index: u64,

    /// Term of candidate's last log entry.
    pub last_log_term: u64,
}

/// RequestVote RPC response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Vote response: peer {} term {} granted {}",
    peer_id,
    term,
    vote_granted
)]
pub struct VoteResponse {
    /// Current term of the voter, for the candidate to update itself.
    pub term: u64,

    /// True means candidate received the vote.
    pub vote_granted: bool,

    /// Voter id.
    pub peer_id: u64,
}

/// AppendEntries RPC request. Empty entries means heartbeat.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Append entries request: term {} leader {} prev index {} prev term {} entries {} commit {}",
    term,
    leader_id,
    prev_log_index,
    prev_log_term,
    "entries.len()",
    leader_commit
)]
pub struct AppendEntriesRequest {
    /// Leader's term.
    pub term: u64,

    /// Leader id, lets followers redirect clients.
    pub leader_id: u64,

    /// Index of the log entry immediately preceding the new ones.
    pub prev_log_index: u64,

    /// Term of the prev_log_index entry (0 for the sentinel).
    pub prev_log_term: u64,

    /// Entries to store.
    pub entries: Vec<LogEntry>,

    /// Leader's commit index.
    pub leader_commit: u64,
}

/// AppendEntries RPC response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Append entries response: term {} success {} last log index {}",
    term,
    success,
    last_log_index
)]
pub struct AppendEntriesResponse {
    /// Current term of the follower, for the leader to update itself.
    pub term: u64,

    /// True if the follower contained an entry matching prev_log_index and prev_log_term.
    pub success: bool,

    /// Follower's last log index. Lets the leader skip back faster on a mismatch.
    pub last_log_index: u64,
}

/// Transport abstraction for the outbound peer RPCs.
///
/// Implementations must return within the provided timeout. Any error is
/// treated by the node as a missing reply.
pub trait PeerRequestHandler: Send + Sync + Clone + 'static {
    /// Sends RequestVote RPC to the destination node.
    fn send_vote_request(
        &self,
        destination_node_id: u64,
        request: VoteRequest,
        timeout: Duration,
    ) -> Result<VoteResponse, RaftError>;

    /// Sends AppendEntries RPC to the destination node.
    fn send_append_entries_request(
        &self,
        destination_node_id: u64,
        request: AppendEntriesRequest,
        timeout: Duration,
    ) -> Result<AppendEntriesResponse, RaftError>;
}

/// Inbound side of the peer transport: channels a node listens on.
pub trait PeerRequestChannels: Send + Sync + Clone + 'static {
    /// Returns receiver channel for the RequestVote RPCs addressed to the node.
    fn vote_request_rx(
        &self,
        node_id: u64,
    ) -> Result<Receiver<InboundRequest<VoteRequest, VoteResponse>>, RaftError>;

    /// Returns receiver channel for the AppendEntries RPCs addressed to the node.
    fn append_entries_request_rx(
        &self,
        node_id: u64,
    ) -> Result<Receiver<InboundRequest<AppendEntriesRequest, AppendEntriesResponse>>, RaftError>;
}
