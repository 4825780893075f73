use std::collections::HashMap;
use std::time::Duration;

use raft::{
    ClientRequestHandler, ElectionTimer, LogEntry, NodeConfiguration, NodeStatus,
    NodeStatusResponse, NodeTimings, NodeWorker, ProposeRequest, ProposeResponse,
};
use raft_modules::{
    ClusterConfiguration, InProcClientCommunicator, InProcPeerCommunicator,
    MemoryPersistentStore, MemoryRsm, RandomizedElectionTimer,
};

use crate::steps;

pub struct CaseNode {
    pub worker: Option<NodeWorker>,
    pub client: InProcClientCommunicator,
    pub rsm: MemoryRsm,
    pub store: MemoryPersistentStore,
}

/// In-process cluster with a shared fault-injecting transport.
///
/// Every status observation is checked for election safety: one leader per term.
pub struct CaseCluster<Et>
where
    Et: ElectionTimer + Clone,
{
    pub node_ids: Vec<u64>,
    pub peer_communicator: InProcPeerCommunicator,
    nodes: HashMap<u64, CaseNode>,
    election_timers: HashMap<u64, Et>,
    leaders_by_term: HashMap<u64, u64>,
}

/// Starts the cluster with randomized election timers.
pub fn start_cluster(node_ids: Vec<u64>) -> CaseCluster<RandomizedElectionTimer> {
    let base_ms = steps::get_election_base_timeout_ms();

    start_cluster_with_timers(node_ids, |_| RandomizedElectionTimer::new(base_ms))
}

pub fn start_cluster_with_timers<Et, F>(node_ids: Vec<u64>, timer_for: F) -> CaseCluster<Et>
where
    Et: ElectionTimer + Clone,
    F: Fn(u64) -> Et,
{
    steps::init_logger();

    let mut cluster = CaseCluster {
        node_ids: node_ids.clone(),
        peer_communicator: InProcPeerCommunicator::new(node_ids.clone()),
        nodes: HashMap::new(),
        election_timers: HashMap::new(),
        leaders_by_term: HashMap::new(),
    };

    for node_id in node_ids {
        cluster.election_timers.insert(node_id, timer_for(node_id));
        cluster.nodes.insert(
            node_id,
            CaseNode {
                worker: None,
                client: InProcClientCommunicator::new(
                    node_id,
                    steps::get_client_communication_timeout(),
                ),
                rsm: MemoryRsm::new(),
                store: MemoryPersistentStore::new(),
            },
        );
        cluster.start_node(node_id);
    }

    cluster
}

impl<Et> CaseCluster<Et>
where
    Et: ElectionTimer + Clone,
{
    fn node(&self, node_id: u64) -> &CaseNode {
        match self.nodes.get(&node_id) {
            Some(node) => node,
            None => panic!("Unknown node {}", node_id),
        }
    }

    fn node_mut(&mut self, node_id: u64) -> &mut CaseNode {
        match self.nodes.get_mut(&node_id) {
            Some(node) => node,
            None => panic!("Unknown node {}", node_id),
        }
    }

    fn start_node(&mut self, node_id: u64) {
        let election_timer = self.election_timers[&node_id].clone();
        let cluster_configuration = ClusterConfiguration::new(self.node_ids.clone());
        let peer_communicator = self.peer_communicator.clone();
        let node = self.node_mut(node_id);

        let config = NodeConfiguration {
            node_id,
            cluster_configuration,
            peer_communicator,
            client_communicator: node.client.clone(),
            election_timer,
            rsm: node.rsm.clone(),
            state_store: node.store.clone(),
            timings: NodeTimings {
                heartbeat_timeout: steps::get_heartbeat_timeout(),
                communication_timeout: steps::get_peers_communication_timeout(),
                ..NodeTimings::default()
            },
        };

        node.worker = Some(raft::start_node(config));
        info!("Case: node {} started", node_id);
    }

    /// Stops the node worker. Its persistent store is kept.
    pub fn terminate_node(&mut self, node_id: u64) {
        if let Some(worker) = self.node_mut(node_id).worker.take() {
            worker.terminate();
        }
        info!("Case: node {} terminated", node_id);
    }

    /// Starts the node again from its persistent store with a fresh state machine.
    pub fn restart_node(&mut self, node_id: u64) {
        self.terminate_node(node_id);
        self.node_mut(node_id).rsm = MemoryRsm::new();
        self.start_node(node_id);
    }

    pub fn is_node_finished(&self, node_id: u64) -> bool {
        match &self.node(node_id).worker {
            Some(worker) => worker.is_finished(),
            None => true,
        }
    }

    pub fn store(&self, node_id: u64) -> &MemoryPersistentStore {
        &self.node(node_id).store
    }

    pub fn applied_data(&self, node_id: u64) -> Vec<Vec<u8>> {
        self.node(node_id).rsm.applied_data()
    }

    pub fn saved_log(&self, node_id: u64) -> Vec<LogEntry> {
        self.store(node_id).saved_state().log.entries().to_vec()
    }

    pub fn status(&mut self, node_id: u64) -> Option<NodeStatusResponse> {
        let status = self.node(node_id).client.status().ok()?;
        self.record_leader(&status);

        Some(status)
    }

    /// Statuses of all responsive nodes.
    pub fn observe(&mut self) -> Vec<NodeStatusResponse> {
        let node_ids = self.node_ids.clone();

        node_ids
            .into_iter()
            .filter_map(|node_id| self.status(node_id))
            .collect()
    }

    fn record_leader(&mut self, status: &NodeStatusResponse) {
        if status.status != NodeStatus::Leader {
            return;
        }

        let leader_id = *self
            .leaders_by_term
            .entry(status.term)
            .or_insert(status.node_id);
        assert_eq!(
            leader_id, status.node_id,
            "two leaders in term {}: {} and {}",
            status.term, leader_id, status.node_id
        );
    }

    /// Waits for a leader among the provided nodes and returns its status.
    pub fn wait_for_leader_among(&mut self, node_ids: &[u64], timeout: Duration) -> NodeStatusResponse {
        let mut leader = None;
        let found = steps::wait_until(timeout, || {
            let statuses: Vec<NodeStatusResponse> = node_ids
                .iter()
                .filter_map(|node_id| self.status(*node_id))
                .collect();

            let max_term = statuses.iter().map(|status| status.term).max().unwrap_or(0);
            leader = statuses
                .into_iter()
                .find(|status| status.status == NodeStatus::Leader && status.term == max_term);

            leader.is_some()
        });

        match leader {
            Some(leader) if found => {
                info!("Case: leader {} in term {}", leader.node_id, leader.term);
                leader
            }
            _ => panic!("No leader elected among {:?}", node_ids),
        }
    }

    pub fn wait_for_leader(&mut self) -> NodeStatusResponse {
        let node_ids = self.node_ids.clone();

        self.wait_for_leader_among(&node_ids, steps::get_convergence_timeout())
    }

    pub fn propose(&self, node_id: u64, data: Vec<u8>) -> ProposeResponse {
        let response = self.node(node_id).client.propose(ProposeRequest { data });
        match response {
            Ok(response) => response,
            Err(err) => panic!("Propose to node {} failed: {}", node_id, err),
        }
    }

    /// Proposes to the current leader among the nodes, retrying after leadership changes.
    pub fn propose_to_leader_among(&mut self, node_ids: &[u64], data: Vec<u8>) -> ProposeResponse {
        for _ in 0..10 {
            let leader = self.wait_for_leader_among(node_ids, steps::get_convergence_timeout());
            if let Ok(response) = self
                .node(leader.node_id)
                .client
                .propose(ProposeRequest { data: data.clone() })
            {
                if response.is_leader {
                    return response;
                }
            }
        }

        panic!("Cannot propose to the leader among {:?}", node_ids)
    }

    pub fn propose_to_leader(&mut self, data: Vec<u8>) -> ProposeResponse {
        let node_ids = self.node_ids.clone();

        self.propose_to_leader_among(&node_ids, data)
    }

    /// Waits until every provided node applied exactly the expected commands.
    pub fn wait_for_applied(&self, node_ids: &[u64], expected: &[Vec<u8>]) {
        let applied = steps::wait_until(steps::get_convergence_timeout(), || {
            node_ids
                .iter()
                .all(|node_id| self.applied_data(*node_id) == expected)
        });

        if !applied {
            for node_id in node_ids {
                error!(
                    "Case: node {} applied {} entries",
                    node_id,
                    self.applied_data(*node_id).len()
                );
            }
            panic!("Entries were not applied on {:?}", node_ids);
        }
    }

    /// Waits until the saved logs of the provided nodes are identical.
    pub fn wait_for_equal_logs(&self, node_ids: &[u64]) -> Vec<LogEntry> {
        let mut log = Vec::new();
        let equal = steps::wait_until(steps::get_convergence_timeout(), || {
            log = self.saved_log(node_ids[0]);
            node_ids[1..]
                .iter()
                .all(|node_id| self.saved_log(*node_id) == log)
        });

        assert!(equal, "Logs of {:?} did not converge", node_ids);

        log
    }

    pub fn terminate(mut self) {
        for node_id in self.node_ids.clone() {
            self.terminate_node(node_id);
        }
    }
}
