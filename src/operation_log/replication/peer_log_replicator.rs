use crate::communication::peers::{AppendEntriesRequest, AppendEntriesResponse};
use crate::errors::Result;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, NodeStatus, PersistentStore};
use crate::operation_log::replication::AppendEntriesRequestInfo;
use crate::rsm::ReplicatedStateMachine;

/// Builds the next AppendEntries request for the peer and marks it in flight.
///
/// Returns None when the node is not the leader, a request to the peer is already
/// in flight, or the peer is up to date and no heartbeat is due.
pub fn next_append_entries_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    peer_id: u64,
    heartbeat: bool,
) -> Option<AppendEntriesRequest>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    if node.status() != NodeStatus::Leader || node.replication_in_flight.contains(&peer_id) {
        return None;
    }

    let last_index = node.log().get_last_entry_index();
    let next_index = node.next_index_of(peer_id).max(1).min(last_index + 1);
    if next_index > last_index && !heartbeat {
        return None;
    }

    let prev_log_index = next_index - 1;
    let prev_log_term = node.log().get_term_at(prev_log_index).unwrap_or(0);
    let entries = node
        .log()
        .get_entries_from(next_index, node.max_entries_per_request);

    node.replication_in_flight.insert(peer_id);

    Some(AppendEntriesRequest {
        term: node.current_term(),
        leader_id: node.id,
        prev_log_index,
        prev_log_term,
        entries,
        leader_commit: node.commit_index,
    })
}

/// Releases the peer after a transport failure. The next heartbeat retries.
pub fn replication_failed<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    peer_id: u64,
    request_info: AppendEntriesRequestInfo,
) where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    release_peer(node, peer_id, request_info);
}

// requests of an earlier leadership were released when it ended
fn release_peer<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    peer_id: u64,
    request_info: AppendEntriesRequestInfo,
) where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    if request_info.term == node.current_term() {
        node.replication_in_flight.remove(&peer_id);
    }
}

/// Updates the peer replication progress and the commit index.
/// Returns true if another request should be sent to the peer right away.
pub fn process_append_entries_response<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    peer_id: u64,
    request_info: AppendEntriesRequestInfo,
    response: AppendEntriesResponse,
) -> Result<bool>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    trace!(
        "Node {} received from {} ({}): {}",
        node.id,
        peer_id,
        request_info,
        response
    );

    release_peer(node, peer_id, request_info);

    if response.term > node.current_term() {
        info!(
            "Node {} found higher term {} in the append entries response from {}",
            node.id, response.term, peer_id
        );
        node.become_follower(response.term)?;
        return Ok(false);
    }

    if node.status() != NodeStatus::Leader || request_info.term != node.current_term() {
        return Ok(false);
    }

    let match_index = node.match_index_of(peer_id);
    if response.success {
        let new_match_index = request_info.prev_log_index + request_info.entry_count;
        if new_match_index > match_index {
            node.match_index.insert(peer_id, new_match_index);
            advance_commit_index(node);
        }
        let next_index = node.match_index_of(peer_id) + 1;
        node.next_index.insert(peer_id, next_index);

        return Ok(next_index <= node.log().get_last_entry_index());
    }

    // never below the known match, never below the sentinel
    let hinted_next_index = request_info
        .prev_log_index
        .min(response.last_log_index + 1)
        .max(1);
    let next_index = hinted_next_index.max(match_index + 1);
    debug!(
        "Node {} backs off peer {} next index to {}",
        node.id, peer_id, next_index
    );
    node.next_index.insert(peer_id, next_index);

    Ok(true)
}

/// Commits the highest current-term index replicated on the majority.
pub fn advance_commit_index<Rsm, Ns, Cl>(node: &mut Node<Rsm, Ns, Cl>)
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    if node.status() != NodeStatus::Leader {
        return;
    }

    let current_term = node.current_term();
    let quorum_size = node.quorum_size();
    let mut index = node.log().get_last_entry_index();

    while index > node.commit_index {
        let entry_term = node.log().get_term_at(index).unwrap_or(0);
        if entry_term < current_term {
            break;
        }

        if entry_term == current_term {
            let replicated_count = 1 + node
                .match_index
                .values()
                .filter(|match_index| **match_index >= index)
                .count();

            if replicated_count >= quorum_size {
                debug!(
                    "Node {} commit index changed {} -> {}",
                    node.id, node.commit_index, index
                );
                node.commit_index = index;
                break;
            }
        }

        index -= 1;
    }
}
