use crossbeam_channel::Receiver;

use crate::communication::InboundRequest;
use crate::errors::RaftError;
use crate::node::state::NodeStatus;

/// Client request to append a new command to the operation log.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Propose request: data size {}", "data.len()")]
pub struct ProposeRequest {
    /// Command serialized in bytes format.
    pub data: Vec<u8>,
}

/// Result of the proposal. Index and term are meaningful only when `is_leader` is true.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Propose response: index {} term {} is leader {} current leader {:?}",
    index,
    term,
    is_leader,
    current_leader
)]
pub struct ProposeResponse {
    /// Log index assigned to the command.
    pub index: u64,

    /// Term of the new entry (or the current term on rejection).
    pub term: u64,

    /// False means the node refused the command, retry elsewhere.
    pub is_leader: bool,

    /// Current leader hint. Can be empty if no leader known to the moment.
    pub current_leader: Option<u64>,
}

/// Client request for the node status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default, Display)]
#[display(fmt = "Status request")]
pub struct StatusRequest;

/// Snapshot of the node volatile and persistent counters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Node {} status: {} term {} commit {} applied {} last index {} leader {:?}",
    node_id,
    status,
    term,
    commit_index,
    last_applied,
    last_log_index,
    current_leader
)]
pub struct NodeStatusResponse {
    pub node_id: u64,
    pub term: u64,
    pub status: NodeStatus,
    pub commit_index: u64,
    pub last_applied: u64,
    pub last_log_index: u64,
    pub current_leader: Option<u64>,
}

/// API abstraction for the communications with clients.
pub trait ClientRequestHandler: Clone + Sync + Send + 'static {
    /// Proposes new data(command) for the operation log.
    fn propose(&self, request: ProposeRequest) -> Result<ProposeResponse, RaftError>;

    /// Queries the node status.
    fn status(&self) -> Result<NodeStatusResponse, RaftError>;
}

/// Abstraction for channels responsible for the communications with clients.
pub trait ClientRequestChannels: Send + Clone + 'static {
    /// Returns receiver channel for the proposals.
    fn propose_request_rx(&self) -> Receiver<InboundRequest<ProposeRequest, ProposeResponse>>;

    /// Returns receiver channel for the status requests.
    fn status_request_rx(&self) -> Receiver<InboundRequest<StatusRequest, NodeStatusResponse>>;
}
