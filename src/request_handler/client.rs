use crate::communication::client::{NodeStatusResponse, ProposeRequest, ProposeResponse, StatusRequest};
use crate::communication::InboundRequest;
use crate::errors::Result;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, NodeStatus, PersistentStore};
use crate::operation_log::replication::peer_log_replicator::advance_commit_index;
use crate::rsm::ReplicatedStateMachine;

/// Appends the command to the leader log and persists it. Non-leaders refuse with a leader hint.
/// Replication is left to the caller.
pub fn propose<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    request: ProposeRequest,
) -> Result<ProposeResponse>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    if node.status() != NodeStatus::Leader {
        debug!(
            "Node {} is {}, proposal refused. Leader: {:?}",
            node.id,
            node.status(),
            node.current_leader_id()
        );

        return Ok(ProposeResponse {
            index: 0,
            term: node.current_term(),
            is_leader: false,
            current_leader: node.current_leader_id(),
        });
    }

    let term = node.current_term();
    let index = node.state.log.append_new_entry(term, request.data);
    node.persist()?;

    trace!("Node {} appended entry {} in term {}", node.id, index, term);

    // commits at once when the node is the whole majority
    advance_commit_index(node);

    Ok(ProposeResponse {
        index,
        term,
        is_leader: true,
        current_leader: Some(node.id),
    })
}

/// Replies to the proposal. Returns true if a new entry was appended.
pub fn handle_propose_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    inbound: InboundRequest<ProposeRequest, ProposeResponse>,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    trace!("Node {} received {}", node.id, inbound.request);

    let InboundRequest {
        request,
        response_tx,
    } = inbound;

    let response = propose(node, request)?;
    if response_tx.try_send(response).is_err() {
        debug!("Node {}: propose caller is gone, {} dropped", node.id, response);
    }

    Ok(response.is_leader)
}

pub fn handle_status_request<Rsm, Ns, Cl>(
    node: &Node<Rsm, Ns, Cl>,
    inbound: InboundRequest<StatusRequest, NodeStatusResponse>,
) where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    let response = node.status_response();
    if !inbound.reply(response) {
        debug!("Node {}: status caller is gone", node.id);
    }
}
