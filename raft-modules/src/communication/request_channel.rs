use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

use raft::{new_err, InboundRequest, RaftError};

/// Request channel where every request carries its own one-shot reply channel.
#[derive(Clone, Debug)]
pub struct RequestChannel<Request, Response> {
    name: String,
    request_tx: Sender<InboundRequest<Request, Response>>,
    request_rx: Receiver<InboundRequest<Request, Response>>,
}

impl<Request, Response> RequestChannel<Request, Response> {
    /// Creates new RequestChannel with the name used in error messages.
    pub fn new(name: String) -> RequestChannel<Request, Response> {
        // rendezvous: requests are not queued for a node that is not listening
        let (request_tx, request_rx) = crossbeam_channel::bounded(0);

        RequestChannel {
            name,
            request_tx,
            request_rx,
        }
    }

    /// Returns the receiver channel for the requests.
    pub fn request_rx(&self) -> Receiver<InboundRequest<Request, Response>> {
        self.request_rx.clone()
    }

    /// Sends request and waits for the response. The timeout covers both.
    pub fn send_request(&self, request: Request, timeout: Duration) -> Result<Response, RaftError> {
        let deadline = Instant::now() + timeout;
        let (response_tx, response_rx) = crossbeam_channel::bounded(1);

        let send_result = self
            .request_tx
            .send_deadline(InboundRequest::new(request, response_tx), deadline);
        if let Err(err) = send_result {
            return new_err(
                format!("Cannot send request. Channel : {}", self.name),
                err.to_string(),
            );
        }

        match response_rx.recv_deadline(deadline) {
            Ok(response) => Ok(response),
            Err(err) => new_err(
                format!("Cannot receive response. Channel : {}", self.name),
                err.to_string(),
            ),
        }
    }
}
