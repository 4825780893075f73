//! Implementations of the raft-core collaborators for in-process clusters and tests.

#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;

mod cluster;
mod communication;
mod election;
mod memory_rsm;
mod persistence;

pub use cluster::ClusterConfiguration;
pub use communication::inproc::inproc_client_communicator::InProcClientCommunicator;
pub use communication::inproc::inproc_peer_communicator::InProcPeerCommunicator;
pub use communication::request_channel::RequestChannel;
pub use election::fixed_election_timer::FixedElectionTimer;
pub use election::randomized_election_timer::RandomizedElectionTimer;
pub use memory_rsm::MemoryRsm;
pub use persistence::file_store::FilePersistentStore;
pub use persistence::memory_store::MemoryPersistentStore;
