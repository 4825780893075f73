use crate::steps;
use crate::steps::data::{command, commands};

/// A follower that cannot persist halts; the remaining majority keeps committing.
pub fn run() {
    let node_ids = vec![1, 2, 3];
    let mut cluster = steps::cluster::start_cluster(node_ids.clone());

    cluster.propose_to_leader(command("a"));
    cluster.wait_for_applied(&node_ids, &commands(&["a"]));

    let leader = cluster.wait_for_leader();
    let failing = node_ids
        .iter()
        .cloned()
        .find(|node_id| *node_id != leader.node_id)
        .unwrap();
    let others: Vec<u64> = node_ids
        .iter()
        .cloned()
        .filter(|node_id| *node_id != failing)
        .collect();

    cluster.store(failing).set_fail_writes(true);
    cluster.propose_to_leader_among(&others, command("b"));

    let halted = steps::wait_until(steps::get_convergence_timeout(), || {
        cluster.is_node_finished(failing)
    });
    assert!(halted, "Node {} did not halt", failing);
    assert!(cluster.status(failing).is_none());

    cluster.wait_for_applied(&others, &commands(&["a", "b"]));
    assert_eq!(commands(&["a"]), cluster.applied_data(failing));
    assert_eq!(1, cluster.store(failing).saved_state().log.get_last_entry_index());

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_persistence_failure() {
        crate::cases::persistence_failure::run()
    }
}
