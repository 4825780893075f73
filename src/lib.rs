//! Raft consensus core: leader election, log replication and commit for a static cluster.
//!
//! A node runs as a single worker thread driving an event loop. Collaborators are
//! plugged in through traits: `PersistentStore`, `PeerRequestHandler` and
//! `PeerRequestChannels` (transport), `ReplicatedStateMachine`, `ElectionTimer`,
//! `Cluster` and `ClientRequestChannels`.

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
#[macro_use]
extern crate derive_more;

mod common;
mod communication;
mod errors;
mod leadership;
mod node;
mod operation_log;
mod request_handler;
mod rsm;

pub use communication::client::{
    ClientRequestChannels, ClientRequestHandler, NodeStatusResponse, ProposeRequest,
    ProposeResponse, StatusRequest,
};
pub use communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestChannels, PeerRequestHandler,
    VoteRequest, VoteResponse,
};
pub use communication::InboundRequest;
pub use errors::{new_err, RaftError};
pub use leadership::ElectionTimer;
pub use node::configuration::{Cluster, NodeConfiguration, NodeTimings};
pub use node::state::{NodeStatus, PersistentState, PersistentStore};
pub use operation_log::{LogEntry, OperationLog};
pub use rsm::ReplicatedStateMachine;

/// Handle of a running node.
pub type NodeWorker = common::RaftWorker;

/// Starts the node worker thread.
///
/// The worker stops when terminated through the returned handle or when the node
/// halts on a fatal error (persistence failure, invalid configuration).
pub fn start_node<Rsm, Cc, Pc, Et, Ns, Cl>(
    node_config: NodeConfiguration<Rsm, Cc, Pc, Et, Ns, Cl>,
) -> NodeWorker
where
    Rsm: ReplicatedStateMachine,
    Cc: ClientRequestChannels,
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
    Ns: PersistentStore,
    Cl: Cluster,
{
    common::run_worker(node::start, node_config)
}
