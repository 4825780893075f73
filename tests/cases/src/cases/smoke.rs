use crate::steps;
use crate::steps::data::{command, commands};

pub fn run() {
    let node_ids = vec![1, 2, 3];
    let mut cluster = steps::cluster::start_cluster(node_ids.clone());

    let leader = cluster.wait_for_leader();

    let response = cluster.propose(leader.node_id, command("x=1"));
    assert!(response.is_leader);
    assert_eq!(1, response.index);

    cluster.wait_for_applied(&node_ids, &commands(&["x=1"]));

    // followers redirect to the leader
    for status in cluster.observe() {
        assert_eq!(Some(leader.node_id), status.current_leader);
        assert_eq!(1, status.commit_index);
    }

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_smoke() {
        crate::cases::smoke::run()
    }
}
