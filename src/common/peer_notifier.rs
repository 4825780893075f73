use crossbeam_channel::Sender;
use rayon::ThreadPool;
use std::time::Duration;

use crate::common::PeerResponseEvent;
use crate::communication::peers::{AppendEntriesRequest, PeerRequestHandler, VoteRequest};
use crate::errors::{new_err, Result};
use crate::operation_log::replication::AppendEntriesRequestInfo;

/// Dispatches outbound RPCs concurrently and feeds replies back as events.
/// Never blocks the caller on a peer.
pub struct PeerNotifier<Pc>
where
    Pc: PeerRequestHandler,
{
    node_id: u64,
    communicator: Pc,
    communication_timeout: Duration,
    pool: ThreadPool,
    peer_event_tx: Sender<PeerResponseEvent>,
}

impl<Pc> PeerNotifier<Pc>
where
    Pc: PeerRequestHandler,
{
    pub fn new(
        node_id: u64,
        communicator: Pc,
        communication_timeout: Duration,
        peer_count: usize,
        peer_event_tx: Sender<PeerResponseEvent>,
    ) -> Result<PeerNotifier<Pc>> {
        // one vote and one append entries request per peer at most
        let thread_count = (peer_count * 2).max(1);
        let pool_result = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(move |idx| format!("raft-node-{}-rpc-{}", node_id, idx))
            .build();

        let pool = match pool_result {
            Ok(pool) => pool,
            Err(err) => {
                return new_err(
                    format!("Node {} cannot create RPC thread pool", node_id),
                    err.to_string(),
                )
            }
        };

        Ok(PeerNotifier {
            node_id,
            communicator,
            communication_timeout,
            pool,
            peer_event_tx,
        })
    }

    pub fn request_votes(&self, peers: Vec<u64>, request: VoteRequest) {
        for peer_id in peers {
            let communicator = self.communicator.clone();
            let peer_event_tx = self.peer_event_tx.clone();
            let timeout = self.communication_timeout;
            let node_id = self.node_id;

            self.pool.spawn(move || {
                let response = communicator.send_vote_request(peer_id, request, timeout);
                let event = PeerResponseEvent::Vote {
                    peer_id,
                    request_term: request.term,
                    response,
                };
                if peer_event_tx.send(event).is_err() {
                    trace!("Node {} stopped, vote response from {} dropped", node_id, peer_id);
                }
            });
        }
    }

    pub fn send_append_entries(&self, peer_id: u64, request: AppendEntriesRequest) {
        let communicator = self.communicator.clone();
        let peer_event_tx = self.peer_event_tx.clone();
        let timeout = self.communication_timeout;
        let node_id = self.node_id;
        let request_info = AppendEntriesRequestInfo::from(&request);

        self.pool.spawn(move || {
            let response = communicator.send_append_entries_request(peer_id, request, timeout);
            let event = PeerResponseEvent::AppendEntries {
                peer_id,
                request_info,
                response,
            };
            if peer_event_tx.send(event).is_err() {
                trace!(
                    "Node {} stopped, append entries response from {} dropped",
                    node_id,
                    peer_id
                );
            }
        });
    }
}

impl<Pc> std::fmt::Debug for PeerNotifier<Pc>
where
    Pc: PeerRequestHandler,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "PeerNotifier {{ node_id: {}, threads: {} }}",
            self.node_id,
            self.pool.current_num_threads()
        )
    }
}
