use crate::common::peer_notifier::PeerNotifier;
use crate::communication::peers::PeerRequestHandler;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, PersistentStore};
use crate::operation_log::replication::peer_log_replicator::next_append_entries_request;
use crate::rsm::ReplicatedStateMachine;

/// Sends AppendEntries to every idle peer: new entries, or an empty heartbeat if `heartbeat` is set.
pub fn replicate_log<Rsm, Ns, Cl, Pc>(
    node: &mut Node<Rsm, Ns, Cl>,
    notifier: &PeerNotifier<Pc>,
    heartbeat: bool,
) where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
    Pc: PeerRequestHandler,
{
    for peer_id in node.peers() {
        replicate_log_to_peer(node, notifier, peer_id, heartbeat);
    }
}

pub fn replicate_log_to_peer<Rsm, Ns, Cl, Pc>(
    node: &mut Node<Rsm, Ns, Cl>,
    notifier: &PeerNotifier<Pc>,
    peer_id: u64,
    heartbeat: bool,
) where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
    Pc: PeerRequestHandler,
{
    if let Some(request) = next_append_entries_request(node, peer_id, heartbeat) {
        trace!("Node {} sends to {}: {}", node.id, peer_id, request);
        notifier.send_append_entries(peer_id, request);
    }
}
