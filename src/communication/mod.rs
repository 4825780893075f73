use crossbeam_channel::Sender;

/// Peer (node to node) RPC contracts.
pub mod peers;

/// Client API exposed by a node.
pub mod client;

/// Request delivered to a node together with its one-shot reply channel.
#[derive(Debug)]
pub struct InboundRequest<Req, Resp> {
    /// Request payload.
    pub request: Req,

    /// Reply channel owned by the caller of this particular request.
    pub response_tx: Sender<Resp>,
}

impl<Req, Resp> InboundRequest<Req, Resp> {
    /// Wraps the request with the reply channel.
    pub fn new(request: Req, response_tx: Sender<Resp>) -> InboundRequest<Req, Resp> {
        InboundRequest {
            request,
            response_tx,
        }
    }

    /// Sends the reply without blocking. Returns false if the caller is gone
    /// (timed out or disconnected).
    pub fn reply(&self, response: Resp) -> bool {
        self.response_tx.try_send(response).is_ok()
    }
}
