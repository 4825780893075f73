use crate::steps;
use crate::steps::data::commands;

pub fn run() {
    let node_ids = vec![1, 2, 3];
    let mut cluster = steps::cluster::start_cluster(node_ids.clone());

    let leader = cluster.wait_for_leader();
    let lagging = node_ids
        .iter()
        .cloned()
        .find(|node_id| *node_id != leader.node_id)
        .unwrap();
    let others: Vec<u64> = node_ids
        .iter()
        .cloned()
        .filter(|node_id| *node_id != lagging)
        .collect();

    cluster.peer_communicator.isolate(lagging);

    let expected = commands(&["1", "2", "3", "4", "5", "6", "7", "8"]);
    for data in expected.iter() {
        cluster.propose_to_leader_among(&others, data.clone());
    }
    cluster.wait_for_applied(&others, &expected);
    assert!(cluster.applied_data(lagging).is_empty());

    cluster.peer_communicator.reconnect(lagging);

    cluster.wait_for_applied(&node_ids, &expected);
    let log = cluster.wait_for_equal_logs(&node_ids);
    assert_eq!(expected.len(), log.len());

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_lagging_follower() {
        crate::cases::lagging_follower::run()
    }
}
