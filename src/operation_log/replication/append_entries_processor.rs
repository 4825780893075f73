use crate::communication::peers::{AppendEntriesRequest, AppendEntriesResponse};
use crate::errors::Result;
use crate::node::configuration::Cluster;
use crate::node::state::{Node, NodeStatus, PersistentStore};
use crate::rsm::ReplicatedStateMachine;

/// Handles AppendEntries RPC on the receiving node. Log changes are persisted
/// before the response is returned.
///
/// A response with the request term means the sender is the legitimate leader
/// and the caller must reset the election timer.
pub fn process_append_entries_request<Rsm, Ns, Cl>(
    node: &mut Node<Rsm, Ns, Cl>,
    request: AppendEntriesRequest,
) -> Result<AppendEntriesResponse>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    trace!("Node {} received {}", node.id, request);

    if request.term < node.current_term() {
        return Ok(reject(node));
    }

    if request.term == node.current_term() && node.status() == NodeStatus::Leader {
        error!(
            "Node {} is the leader of term {} and got AppendEntries from {} of the same term",
            node.id, request.term, request.leader_id
        );
        return Ok(reject(node));
    }

    let mut state_changed = node.step_down(request.term);
    node.current_leader_id = Some(request.leader_id);

    if node.log().get_term_at(request.prev_log_index) != Some(request.prev_log_term) {
        if state_changed {
            node.persist()?;
        }

        debug!(
            "Node {} log mismatch at index {} term {}, last index {}",
            node.id,
            request.prev_log_index,
            request.prev_log_term,
            node.log().get_last_entry_index()
        );
        return Ok(reject(node));
    }

    let is_contiguous = request
        .entries
        .iter()
        .enumerate()
        .all(|(i, entry)| entry.index == request.prev_log_index + 1 + i as u64);
    if !is_contiguous {
        warn!(
            "Node {} got malformed entries from {}: indexes do not follow {}",
            node.id, request.leader_id, request.prev_log_index
        );
        if state_changed {
            node.persist()?;
        }
        return Ok(reject(node));
    }

    let last_new_entry_index = request.prev_log_index + request.entries.len() as u64;
    if node.state.log.merge_entries(request.entries)? {
        state_changed = true;
    }

    if state_changed {
        node.persist()?;
    }

    if request.leader_commit > node.commit_index {
        let new_commit_index = request.leader_commit.min(last_new_entry_index);
        if new_commit_index > node.commit_index {
            trace!(
                "Node {} commit index changed {} -> {}",
                node.id,
                node.commit_index,
                new_commit_index
            );
            node.commit_index = new_commit_index;
        }
    }

    Ok(AppendEntriesResponse {
        term: node.current_term(),
        success: true,
        last_log_index: node.log().get_last_entry_index(),
    })
}

fn reject<Rsm, Ns, Cl>(node: &Node<Rsm, Ns, Cl>) -> AppendEntriesResponse
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    AppendEntriesResponse {
        term: node.current_term(),
        success: false,
        last_log_index: node.log().get_last_entry_index(),
    }
}
