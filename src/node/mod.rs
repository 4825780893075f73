use crossbeam_channel::{Receiver, RecvError};
use std::time::Instant;

use crate::common::peer_notifier::PeerNotifier;
use crate::communication::client::ClientRequestChannels;
use crate::communication::peers::{PeerRequestChannels, PeerRequestHandler};
use crate::errors::{new_err, Result};
use crate::leadership::election::start_election;
use crate::leadership::ElectionTimer;
use crate::node::configuration::{Cluster, NodeConfiguration};
use crate::node::state::{Node, NodeStatus, PersistentStore};
use crate::operation_log::replication::append_entries_sender::replicate_log;
use crate::request_handler::client::{handle_propose_request, handle_status_request};
use crate::request_handler::peer::{
    handle_append_entries_request, handle_vote_request, process_peer_response_event,
};
use crate::rsm::updater::apply_committed_entries;
use crate::rsm::ReplicatedStateMachine;

pub mod configuration;
pub mod state;

/// Node worker entry point. Runs the node event loop until termination or a fatal error.
pub fn start<Rsm, Cc, Pc, Et, Ns, Cl>(
    config: NodeConfiguration<Rsm, Cc, Pc, Et, Ns, Cl>,
    terminate_worker_rx: Receiver<()>,
) where
    Rsm: ReplicatedStateMachine,
    Cc: ClientRequestChannels,
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
    Ns: PersistentStore,
    Cl: Cluster,
{
    let node_id = config.node_id;
    info!("Node {} worker started", node_id);

    match run_node(config, terminate_worker_rx) {
        Ok(()) => info!("Node {} worker stopped", node_id),
        Err(err) => error!("Node {} halted: {}", node_id, err),
    }
}

fn run_node<Rsm, Cc, Pc, Et, Ns, Cl>(
    config: NodeConfiguration<Rsm, Cc, Pc, Et, Ns, Cl>,
    terminate_worker_rx: Receiver<()>,
) -> Result<()>
where
    Rsm: ReplicatedStateMachine,
    Cc: ClientRequestChannels,
    Pc: PeerRequestHandler + PeerRequestChannels,
    Et: ElectionTimer,
    Ns: PersistentStore,
    Cl: Cluster,
{
    let node_id = config.node_id;
    let timings = config.timings;
    let election_timer = config.election_timer;
    timings.validate(election_timer.min_elections_timeout())?;

    let vote_request_rx = config.peer_communicator.vote_request_rx(node_id)?;
    let append_entries_request_rx = config.peer_communicator.append_entries_request_rx(node_id)?;
    let propose_request_rx = config.client_communicator.propose_request_rx();
    let status_request_rx = config.client_communicator.status_request_rx();

    let (peer_event_tx, peer_event_rx) = crossbeam_channel::unbounded();
    let peer_count = config.cluster_configuration.peers(node_id).len();
    let notifier = PeerNotifier::new(
        node_id,
        config.peer_communicator,
        timings.communication_timeout,
        peer_count,
        peer_event_tx,
    )?;

    let mut node = Node::new(
        node_id,
        config.cluster_configuration,
        config.rsm,
        config.state_store,
        timings.max_entries_per_request,
    )?;
    info!("Node {} recovered {}", node_id, node.state);

    let heartbeat_tick = crossbeam_channel::tick(timings.heartbeat_timeout);
    let mut election_deadline = Instant::now() + election_timer.next_elections_timeout();

    loop {
        let election_timeout = crossbeam_channel::at(election_deadline);

        select!(
            recv(terminate_worker_rx) -> res => {
                if res.is_err() {
                    error!("Abnormal exit for node {} worker", node_id);
                }
                break
            },
            recv(vote_request_rx) -> res => {
                let inbound = received(res, node_id, "vote request")?;
                if handle_vote_request(&mut node, inbound)? {
                    election_deadline = Instant::now() + election_timer.next_elections_timeout();
                }
            },
            recv(append_entries_request_rx) -> res => {
                let inbound = received(res, node_id, "append entries request")?;
                if handle_append_entries_request(&mut node, inbound)? {
                    election_deadline = Instant::now() + election_timer.next_elections_timeout();
                }
            },
            recv(propose_request_rx) -> res => {
                let inbound = received(res, node_id, "propose request")?;
                if handle_propose_request(&mut node, inbound)? {
                    replicate_log(&mut node, &notifier, false);
                }
            },
            recv(status_request_rx) -> res => {
                let inbound = received(res, node_id, "status request")?;
                handle_status_request(&node, inbound);
            },
            recv(peer_event_rx) -> res => {
                let event = received(res, node_id, "peer response")?;
                if process_peer_response_event(&mut node, &notifier, event)? {
                    election_deadline = Instant::now() + election_timer.next_elections_timeout();
                }
            },
            recv(heartbeat_tick) -> _ => {
                if node.status() == NodeStatus::Leader {
                    replicate_log(&mut node, &notifier, true);
                }
            },
            recv(election_timeout) -> _ => {
                if node.status() != NodeStatus::Leader {
                    let vote_request = start_election(&mut node)?;
                    if node.status() == NodeStatus::Leader {
                        replicate_log(&mut node, &notifier, true);
                    } else {
                        notifier.request_votes(node.peers(), vote_request);
                    }
                }
                election_deadline = Instant::now() + election_timer.next_elections_timeout();
            },
        );

        apply_committed_entries(&mut node);
    }

    Ok(())
}

fn received<T>(result: std::result::Result<T, RecvError>, node_id: u64, channel: &str) -> Result<T> {
    match result {
        Ok(message) => Ok(message),
        Err(err) => new_err(
            format!("Node {} {} channel disconnected", node_id, channel),
            err.to_string(),
        ),
    }
}
