use crate::communication::peers::{VoteRequest, VoteResponse};
use crate::errors::Result;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, PersistentStore};
use crate::rsm::ReplicatedStateMachine;

/// Handles RequestVote RPC. The vote is persisted before the response is returned.
/// Granted vote means the caller must reset the election timer.
pub fn process_vote_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    request: VoteRequest,
) -> Result<VoteResponse>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    trace!("Node {} received {}", node.id, request);

    if request.term < node.current_term() {
        return Ok(VoteResponse {
            term: node.current_term(),
            vote_granted: false,
            peer_id: node.id,
        });
    }

    let mut state_changed = false;
    if request.term > node.current_term() {
        state_changed = node.step_down(request.term);
    }

    let can_vote = match node.voted_for_id() {
        None => true,
        Some(voted_for_id) => voted_for_id == request.candidate_id,
    };

    let vote_granted = can_vote
        && node.is_candidate_log_up_to_date(request.last_log_term, request.last_log_index);

    if vote_granted && node.voted_for_id().is_none() {
        node.state.voted_for_id = Some(request.candidate_id);
        state_changed = true;
    }

    if state_changed {
        node.persist()?;
    }

    if vote_granted {
        info!(
            "Node {} voted for {} in term {}",
            node.id,
            request.candidate_id,
            node.current_term()
        );
    } else {
        debug!(
            "Node {} rejected vote for {} in term {} (voted for {:?})",
            node.id,
            request.candidate_id,
            node.current_term(),
            node.voted_for_id()
        );
    }

    Ok(VoteResponse {
        term: node.current_term(),
        vote_granted,
        peer_id: node.id,
    })
}
