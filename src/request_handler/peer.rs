use crate::common::peer_notifier::PeerNotifier;
use crate::common::PeerResponseEvent;
use crate::communication::peers::{
    AppendEntriesRequest, AppendEntriesResponse, PeerRequestHandler, VoteRequest, VoteResponse,
};
use crate::communication::InboundRequest;
use crate::errors::Result;
use crate::leadership::election::process_vote_response;
use crate::leadership::vote_request_processor::process_vote_request;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, PersistentStore};
use crate::operation_log::replication::append_entries_processor::process_append_entries_request;
use crate::operation_log::replication::append_entries_sender::{
    replicate_log, replicate_log_to_peer,
};
use crate::operation_log::replication::peer_log_replicator::{
    process_append_entries_response, replication_failed,
};
use crate::rsm::ReplicatedStateMachine;

/// Processes and replies to RequestVote. Returns true if the election timer must be reset.
pub fn handle_vote_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    inbound: InboundRequest<VoteRequest, VoteResponse>,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    let response = process_vote_request(node, inbound.request)?;
    if !inbound.reply(response) {
        debug!(
            "Node {}: vote response to {} dropped, caller is gone",
            node.id, inbound.request.candidate_id
        );
    }

    Ok(response.vote_granted)
}

/// Processes and replies to AppendEntries. Returns true if the election timer must be reset.
pub fn handle_append_entries_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    inbound: InboundRequest<AppendEntriesRequest, AppendEntriesResponse>,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    let InboundRequest {
        request,
        response_tx,
    } = inbound;
    let request_term = request.term;
    let leader_id = request.leader_id;

    let response = process_append_entries_request(node, request)?;
    if response_tx.try_send(response).is_err() {
        debug!(
            "Node {}: append entries response to {} dropped, caller is gone",
            node.id, leader_id
        );
    }

    Ok(response.term == request_term)
}

/// Routes the outcome of an outbound RPC back into the node state.
/// Returns true if a higher term was found and the election timer must be reset.
pub fn process_peer_response_event<Rsm, Ns, Cl, Pc>(
    node: &mut Node<Rsm, Ns, Cl>,
    notifier: &PeerNotifier<Pc>,
    event: PeerResponseEvent,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
    Pc: PeerRequestHandler,
{
    let term = node.current_term();

    match event {
        PeerResponseEvent::Vote {
            peer_id,
            request_term,
            response,
        } => match response {
            Ok(response) => {
                if process_vote_response(node, request_term, response)? {
                    replicate_log(node, notifier, true);
                }
            }
            Err(err) => {
                debug!(
                    "Node {}: vote request to {} failed: {}",
                    node.id, peer_id, err
                );
            }
        },
        PeerResponseEvent::AppendEntries {
            peer_id,
            request_info,
            response,
        } => match response {
            Ok(response) => {
                if process_append_entries_response(node, peer_id, request_info, response)? {
                    replicate_log_to_peer(node, notifier, peer_id, false);
                }
            }
            Err(err) => {
                replication_failed(node, peer_id, request_info);
                debug!(
                    "Node {}: append entries request to {} failed: {}",
                    node.id, peer_id, err
                );
            }
        },
    }

    Ok(node.current_term() != term)
}
