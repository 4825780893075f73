use std::time::Duration;

use crate::communication::client::ClientRequestChannels;
use crate::communication::peers::{PeerRequestChannels, PeerRequestHandler};
use crate::errors::{new_err, Result};
use crate::leadership::ElectionTimer;
use crate::node::state::PersistentStore;
use crate::rsm::ReplicatedStateMachine;

/// Node timing and batching parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeTimings {
    /// Leader heartbeat period. Must be shorter than the minimal election timeout.
    pub heartbeat_timeout: Duration,

    /// Timeout for a single outbound peer RPC.
    pub communication_timeout: Duration,

    /// Maximum number of entries in one AppendEntries request.
    pub max_entries_per_request: usize,
}

impl Default for NodeTimings {
    fn default() -> Self {
        NodeTimings {
            heartbeat_timeout: Duration::from_millis(50),
            communication_timeout: Duration::from_millis(100),
            max_entries_per_request: 64,
        }
    }
}

/// Minimal ratio between the election timeout and the heartbeat period.
pub const MIN_ELECTION_TO_HEARTBEAT_RATIO: u32 = 3;

impl NodeTimings {
    /// Checks the timings against the minimal election timeout of the node.
    ///
    /// A follower may wait for a lost reply timeout plus one heartbeat period before
    /// the leader contacts it again, so this sum must stay below the election timeout.
    pub fn validate(&self, min_election_timeout: Duration) -> Result<()> {
        if self.heartbeat_timeout * MIN_ELECTION_TO_HEARTBEAT_RATIO > min_election_timeout {
            return new_err(
                format!(
                    "Heartbeat timeout {:?} must be at least {} times shorter than minimal election timeout {:?}",
                    self.heartbeat_timeout, MIN_ELECTION_TO_HEARTBEAT_RATIO, min_election_timeout
                ),
                String::new(),
            );
        }

        if self.communication_timeout + self.heartbeat_timeout >= min_election_timeout {
            return new_err(
                format!(
                    "Communication timeout {:?} plus heartbeat timeout {:?} must be shorter than minimal election timeout {:?}",
                    self.communication_timeout, self.heartbeat_timeout, min_election_timeout
                ),
                String::new(),
            );
        }

        if self.max_entries_per_request == 0 {
            return new_err(
                "Max entries per request must be positive".to_string(),
                String::new(),
            );
        }

        Ok(())
    }
}

/// Static cluster membership.
pub trait Cluster: Send + Sync + Clone + 'static {
    /// Majority of all nodes: strictly more than a half.
    fn quorum_size(&self) -> u32;

    /// All node ids of the cluster.
    fn all_nodes(&self) -> Vec<u64>;

    /// All node ids except the provided one.
    fn peers(&self, node_id: u64) -> Vec<u64>;
}

/// Everything needed to start a node.
#[derive(Clone, Debug)]
pub struct NodeConfiguration<Rsm, Cc, Pc, Et, Ns, Cl>
where
    Rsm: ReplicatedStateMachine,
    Cc: ClientRequestChannels,
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
    Ns: PersistentStore,
    Cl: Cluster,
{
    pub node_id: u64,
    pub cluster_configuration: Cl,
    pub peer_communicator: Pc,
    pub client_communicator: Cc,
    pub election_timer: Et,
    pub rsm: Rsm,
    pub state_store: Ns,
    pub timings: NodeTimings,
}
