use raft::Cluster;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Static in-memory implementation of the Cluster trait. Calculates quorum as majority.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterConfiguration {
    nodes: Arc<BTreeSet<u64>>,
}

impl ClusterConfiguration {
    /// Creates an instance of ClusterConfiguration with the provided node ids.
    pub fn new(nodes: Vec<u64>) -> ClusterConfiguration {
        let mut node_set = BTreeSet::new();
        for node in nodes {
            if !node_set.insert(node) {
                warn!("Cluster configuration - duplicate node:{}", node)
            }
        }

        ClusterConfiguration {
            nodes: Arc::new(node_set),
        }
    }
}

impl Cluster for ClusterConfiguration {
    fn quorum_size(&self) -> u32 {
        let half = self.nodes.len() as u32 / 2;

        half + 1 //majority
    }

    fn all_nodes(&self) -> Vec<u64> {
        self.nodes.iter().cloned().collect()
    }

    fn peers(&self, node_id: u64) -> Vec<u64> {
        let mut peer_ids = self.all_nodes();
        peer_ids.retain(|&x| x != node_id);

        peer_ids
    }
}
