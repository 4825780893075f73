use crate::communication::request_channel::RequestChannel;
use crossbeam_channel::Receiver;
use raft::{ClientRequestChannels, ClientRequestHandler, InboundRequest, RaftError};
use raft::{NodeStatusResponse, ProposeRequest, ProposeResponse, StatusRequest};
use std::time::Duration;

/// In-memory implementation of the client API of a single node.
#[derive(Clone, Debug)]
pub struct InProcClientCommunicator {
    timeout: Duration,
    propose_channel: RequestChannel<ProposeRequest, ProposeResponse>,
    status_channel: RequestChannel<StatusRequest, NodeStatusResponse>,
}

impl InProcClientCommunicator {
    pub fn new(node_id: u64, timeout: Duration) -> InProcClientCommunicator {
        InProcClientCommunicator {
            timeout,
            propose_channel: RequestChannel::new(format!("Propose channel NodeId={}", node_id)),
            status_channel: RequestChannel::new(format!("Status channel NodeId={}", node_id)),
        }
    }
}

impl ClientRequestChannels for InProcClientCommunicator {
    fn propose_request_rx(&self) -> Receiver<InboundRequest<ProposeRequest, ProposeResponse>> {
        self.propose_channel.request_rx()
    }

    fn status_request_rx(&self) -> Receiver<InboundRequest<StatusRequest, NodeStatusResponse>> {
        self.status_channel.request_rx()
    }
}

impl ClientRequestHandler for InProcClientCommunicator {
    fn propose(&self, request: ProposeRequest) -> Result<ProposeResponse, RaftError> {
        trace!("Propose request {}", request);
        self.propose_channel.send_request(request, self.timeout)
    }

    fn status(&self) -> Result<NodeStatusResponse, RaftError> {
        self.status_channel.send_request(StatusRequest, self.timeout)
    }
}
