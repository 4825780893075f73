use crate::node::configuration::Cluster;
use crate::node::state::{Node, PersistentStore};
use crate::rsm::ReplicatedStateMachine;

/// Applies entries in (last_applied, commit_index] in order.
/// On a state machine error the entry stays unapplied and is retried on the next call.
pub fn apply_committed_entries<Rsm, Ns, Cl>(node: &mut Node<Rsm, Ns, Cl>)
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    while node.last_applied < node.commit_index {
        let entry_index = node.last_applied + 1;
        let entry = match node.state.log.get_entry(entry_index) {
            Some(entry) => entry,
            None => {
                error!(
                    "Node {}: committed entry {} is missing from the log",
                    node.id, entry_index
                );
                break;
            }
        };

        if let Err(err) = node.rsm.apply_entry(entry) {
            error!("Rsm: 'Apply entry' error. Entry = {}: {}", entry_index, err);
            break;
        }

        node.last_applied = entry_index;
        trace!("Node {} applied entry {}", node.id, entry_index);
    }
}
