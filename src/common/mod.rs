use crossbeam_channel::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

use crate::communication::peers::{AppendEntriesResponse, VoteResponse};
use crate::errors::RaftError;
use crate::operation_log::replication::AppendEntriesRequestInfo;

pub mod peer_notifier;

/// Reply (or its failure) of an outbound RPC, routed back into the node event loop.
#[derive(Debug)]
pub enum PeerResponseEvent {
    Vote {
        peer_id: u64,
        request_term: u64,
        response: Result<VoteResponse, RaftError>,
    },
    AppendEntries {
        peer_id: u64,
        request_info: AppendEntriesRequestInfo,
        response: Result<AppendEntriesResponse, RaftError>,
    },
}

/// Running worker thread with its termination channel.
#[derive(Debug)]
pub struct RaftWorker {
    /// Worker thread handle.
    pub join_handle: JoinHandle<()>,

    /// Sending to this channel requests the worker to stop.
    pub terminate_worker_tx: Sender<()>,
}

impl RaftWorker {
    /// Requests termination and waits for the worker thread to finish.
    pub fn terminate(self) {
        if self.terminate_worker_tx.send(()).is_err() {
            debug!("Worker already stopped, termination signal ignored");
        }

        if self.join_handle.join().is_err() {
            error!("Worker thread panicked");
        }
    }

    /// Returns true if the worker thread has finished (terminated or halted).
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

pub fn run_worker<T, F>(worker: F, params: T) -> RaftWorker
where
    T: Send + 'static,
    F: FnOnce(T, Receiver<()>) + Send + 'static,
{
    let (terminate_worker_tx, terminate_worker_rx): (Sender<()>, Receiver<()>) =
        crossbeam_channel::unbounded();

    let join_handle = thread::spawn(move || worker(params, terminate_worker_rx));

    RaftWorker {
        join_handle,
        terminate_worker_tx,
    }
}
