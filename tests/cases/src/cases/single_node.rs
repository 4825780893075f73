use crate::steps;
use crate::steps::data::commands;

pub fn run() {
    let mut cluster = steps::cluster::start_cluster(vec![1]);

    let leader = cluster.wait_for_leader();
    assert_eq!(1, leader.node_id);

    let expected = commands(&["a", "b", "c"]);
    for data in expected.iter() {
        let response = cluster.propose(1, data.clone());
        assert!(response.is_leader);
    }

    cluster.wait_for_applied(&[1], &expected);

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_single_node() {
        crate::cases::single_node::run()
    }
}
