#[macro_use]
extern crate log;

use cases::cases as case;

fn main() {
    cases::init_logger();

    case::smoke::run();
    case::single_node::run();
    case::leader_isolation::run();
    case::lagging_follower::run();
    case::conflicting_suffix::run();
    case::simultaneous_candidacy::run();
    case::node_restart::run();
    case::persistence_failure::run();

    info!("All cases passed");
}
