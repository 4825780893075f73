use crate::communication::peers::{VoteRequest, VoteResponse};
use crate::errors::Result;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, NodeStatus, PersistentStore};
use crate::rsm::ReplicatedStateMachine;

/// Starts a new election: next term, vote for self, persist.
/// Returns the request to broadcast to the peers. A single node cluster wins immediately.
pub fn start_election<Rsm, Ns, Cl>(node: &mut Node<Rsm, Ns, Cl>) -> Result<VoteRequest>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    node.state.current_term += 1;
    node.state.voted_for_id = Some(node.id);
    node.status = NodeStatus::Candidate;
    node.current_leader_id = None;
    node.votes_granted.clear();
    node.votes_granted.insert(node.id);
    node.persist()?;

    info!(
        "Node {} started election for term {}",
        node.id,
        node.current_term()
    );

    if node.votes_granted.len() >= node.quorum_size() {
        node.become_leader();
    }

    Ok(VoteRequest {
        term: node.current_term(),
        candidate_id: node.id,
        last_log_index: node.log().get_last_entry_index(),
        last_log_term: node.log().get_last_entry_term(),
    })
}

/// Counts the vote. Replies of other terms or roles are discarded.
/// Returns true if the node became the leader.
pub fn process_vote_response<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    request_term: u64,
    response: VoteResponse,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    trace!("Node {} received {}", node.id, response);

    if response.term > node.current_term() {
        info!(
            "Node {} found higher term {} in the vote response from {}",
            node.id, response.term, response.peer_id
        );
        node.become_follower(response.term)?;
        return Ok(false);
    }

    if node.status() != NodeStatus::Candidate || request_term != node.current_term() {
        trace!(
            "Node {} discarded obsolete vote response from {}",
            node.id,
            response.peer_id
        );
        return Ok(false);
    }

    if !response.vote_granted {
        return Ok(false);
    }

    node.votes_granted.insert(response.peer_id);
    if node.votes_granted.len() >= node.quorum_size() {
        node.become_leader();
        return Ok(true);
    }

    Ok(false)
}
