use crate::communication::request_channel::RequestChannel;

use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use raft::{new_err, InboundRequest, RaftError};
use raft::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestChannels, PeerRequestHandler,
    VoteRequest, VoteResponse,
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct NetworkFaults {
    isolated_nodes: HashSet<u64>,
    broken_links: HashSet<(u64, u64)>,
}

impl NetworkFaults {
    fn is_reachable(&self, from: u64, to: u64) -> bool {
        !self.isolated_nodes.contains(&from)
            && !self.isolated_nodes.contains(&to)
            && !self.broken_links.contains(&link(from, to))
    }
}

fn link(node_a: u64, node_b: u64) -> (u64, u64) {
    (node_a.min(node_b), node_a.max(node_b))
}

/// In-memory implementation of the PeerRequestHandler and PeerRequestChannels traits.
/// Supports partitions: an isolated node or a broken link drops every RPC it carries.
#[derive(Clone, Debug)]
pub struct InProcPeerCommunicator {
    votes_channels: HashMap<u64, RequestChannel<VoteRequest, VoteResponse>>,
    append_entries_channels:
        HashMap<u64, RequestChannel<AppendEntriesRequest, AppendEntriesResponse>>,
    faults: Arc<RwLock<NetworkFaults>>,
}

impl InProcPeerCommunicator {
    /// Create new instance of the InProcPeerCommunicator for the provided nodes.
    pub fn new(nodes: Vec<u64>) -> InProcPeerCommunicator {
        let mut communicator = InProcPeerCommunicator {
            votes_channels: HashMap::new(),
            append_entries_channels: HashMap::new(),
            faults: Arc::new(RwLock::new(NetworkFaults::default())),
        };

        for node_id in nodes {
            communicator.add_node_communication(node_id);
        }

        communicator
    }

    fn add_node_communication(&mut self, node_id: u64) {
        let vote_channel = RequestChannel::new(format!("Vote channel NodeId={}", node_id));
        let append_entries_channel =
            RequestChannel::new(format!("AppendEntries channel NodeId={}", node_id));

        self.votes_channels.insert(node_id, vote_channel);
        self.append_entries_channels
            .insert(node_id, append_entries_channel);
    }

    /// Drops all RPCs from and to the node.
    pub fn isolate(&self, node_id: u64) {
        info!("Network: node {} isolated", node_id);
        self.faults.write().isolated_nodes.insert(node_id);
    }

    /// Restores the node connectivity.
    pub fn reconnect(&self, node_id: u64) {
        info!("Network: node {} reconnected", node_id);
        self.faults.write().isolated_nodes.remove(&node_id);
    }

    /// Drops all RPCs between two nodes in both directions.
    pub fn disconnect_link(&self, node_a: u64, node_b: u64) {
        info!("Network: link {} - {} disconnected", node_a, node_b);
        self.faults.write().broken_links.insert(link(node_a, node_b));
    }

    /// Restores the link between two nodes.
    pub fn connect_link(&self, node_a: u64, node_b: u64) {
        info!("Network: link {} - {} connected", node_a, node_b);
        self.faults.write().broken_links.remove(&link(node_a, node_b));
    }

    fn check_reachable(&self, from: u64, to: u64) -> Result<(), RaftError> {
        if !self.faults.read().is_reachable(from, to) {
            return new_err(
                format!("Node {} is unreachable from node {}", to, from),
                String::new(),
            );
        }

        Ok(())
    }

    fn unknown_node<T>(node_id: u64) -> Result<T, RaftError> {
        new_err(format!("Unknown node {}", node_id), String::new())
    }
}

impl PeerRequestHandler for InProcPeerCommunicator {
    fn send_vote_request(
        &self,
        destination_node_id: u64,
        request: VoteRequest,
        timeout: Duration,
    ) -> Result<VoteResponse, RaftError> {
        trace!(
            "Destination Node {} Sending request {}",
            destination_node_id,
            request
        );
        self.check_reachable(request.candidate_id, destination_node_id)?;

        let channel = match self.votes_channels.get(&destination_node_id) {
            Some(channel) => channel,
            None => return Self::unknown_node(destination_node_id),
        };
        let resp = channel.send_request(request, timeout)?;

        // the link may break while the request is processed
        self.check_reachable(request.candidate_id, destination_node_id)?;

        trace!("Destination Node {} Response {}", destination_node_id, resp);

        Ok(resp)
    }

    fn send_append_entries_request(
        &self,
        destination_node_id: u64,
        request: AppendEntriesRequest,
        timeout: Duration,
    ) -> Result<AppendEntriesResponse, RaftError> {
        trace!(
            "Destination Node {} Sending request {}",
            destination_node_id,
            request
        );
        let leader_id = request.leader_id;
        self.check_reachable(leader_id, destination_node_id)?;

        let channel = match self.append_entries_channels.get(&destination_node_id) {
            Some(channel) => channel,
            None => return Self::unknown_node(destination_node_id),
        };
        let resp = channel.send_request(request, timeout)?;

        self.check_reachable(leader_id, destination_node_id)?;

        trace!("Destination Node {} Response {}", destination_node_id, resp);

        Ok(resp)
    }
}

impl PeerRequestChannels for InProcPeerCommunicator {
    fn vote_request_rx(
        &self,
        node_id: u64,
    ) -> Result<Receiver<InboundRequest<VoteRequest, VoteResponse>>, RaftError> {
        match self.votes_channels.get(&node_id) {
            Some(channel) => Ok(channel.request_rx()),
            None => Self::unknown_node(node_id),
        }
    }

    fn append_entries_request_rx(
        &self,
        node_id: u64,
    ) -> Result<Receiver<InboundRequest<AppendEntriesRequest, AppendEntriesResponse>>, RaftError>
    {
        match self.append_entries_channels.get(&node_id) {
            Some(channel) => Ok(channel.request_rx()),
            None => Self::unknown_node(node_id),
        }
    }
}
