use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::communication::client::NodeStatusResponse;
use crate::errors::{new_err, RaftError, Result};
use crate::node::configuration::Cluster;
use crate::operation_log::OperationLog;
use crate::rsm::ReplicatedStateMachine;

#[cfg(test)]
pub(crate) mod mocks;

/// Node state that must survive a crash.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Display)]
#[display(
    fmt = "Persistent state: term {} voted for {:?} {}",
    current_term,
    voted_for_id,
    log
)]
pub struct PersistentState {
    pub current_term: u64,
    pub voted_for_id: Option<u64>,
    pub log: OperationLog,
}

/// Durable storage for the persistent node state.
///
/// `save_state` must not return before the state is durable. Any error is fatal for the node.
pub trait PersistentStore: Send + Sync + 'static {
    fn save_state(&self, state: &PersistentState) -> std::result::Result<(), RaftError>;

    /// Returns the last saved state or the empty state if nothing was saved yet.
    fn load_state(&self) -> std::result::Result<PersistentState, RaftError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum NodeStatus {
    Follower,
    Candidate,
    Leader,
}

/// Single Raft node: persistent and volatile state plus its local collaborators.
/// Mutated only from the node event loop.
#[derive(Debug)]
pub struct Node<Rsm, Ns, Cl>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    pub id: u64,
    pub(crate) state: PersistentState,
    pub(crate) status: NodeStatus,
    pub(crate) current_leader_id: Option<u64>,
    pub(crate) commit_index: u64,
    pub(crate) last_applied: u64,

    pub(crate) votes_granted: HashSet<u64>,

    // leader only, reset on each leadership acquisition
    pub(crate) next_index: HashMap<u64, u64>,
    pub(crate) match_index: HashMap<u64, u64>,
    pub(crate) replication_in_flight: HashSet<u64>,

    pub(crate) max_entries_per_request: usize,
    pub(crate) rsm: Rsm,
    state_store: Ns,
    cluster_configuration: Cl,
}

impl<Rsm, Ns, Cl> Node<Rsm, Ns, Cl>
where
    Rsm: ReplicatedStateMachine,
    Ns: PersistentStore,
    Cl: Cluster,
{
    /// Creates a follower with the state recovered from the store.
    pub fn new(
        id: u64,
        cluster_configuration: Cl,
        rsm: Rsm,
        state_store: Ns,
        max_entries_per_request: usize,
    ) -> Result<Node<Rsm, Ns, Cl>> {
        let state = match state_store.load_state() {
            Ok(state) => state,
            Err(err) => {
                return new_err(
                    format!("Node {} cannot load persistent state", id),
                    err.to_string(),
                )
            }
        };

        if let Some(voted_for_id) = state.voted_for_id {
            if !cluster_configuration.all_nodes().contains(&voted_for_id) {
                warn!(
                    "Node {} recovered a vote for unknown node {}",
                    id, voted_for_id
                );
            }
        }

        Ok(Node {
            id,
            state,
            status: NodeStatus::Follower,
            current_leader_id: None,
            commit_index: 0,
            last_applied: 0,
            votes_granted: HashSet::new(),
            next_index: HashMap::new(),
            match_index: HashMap::new(),
            replication_in_flight: HashSet::new(),
            max_entries_per_request,
            rsm,
            state_store,
            cluster_configuration,
        })
    }

    pub fn current_term(&self) -> u64 {
        self.state.current_term
    }

    pub fn voted_for_id(&self) -> Option<u64> {
        self.state.voted_for_id
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn current_leader_id(&self) -> Option<u64> {
        self.current_leader_id
    }

    pub fn commit_index(&self) -> u64 {
        self.commit_index
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }

    pub fn log(&self) -> &OperationLog {
        &self.state.log
    }

    pub fn peers(&self) -> Vec<u64> {
        self.cluster_configuration.peers(self.id)
    }

    pub fn quorum_size(&self) -> usize {
        self.cluster_configuration.quorum_size() as usize
    }

    /// Saves the persistent state. The node must not act on the state if this fails.
    pub(crate) fn persist(&self) -> Result<()> {
        if let Err(err) = self.state_store.save_state(&self.state) {
            return new_err(
                format!(
                    "Node {} cannot save persistent state (term {})",
                    self.id, self.state.current_term
                ),
                err.to_string(),
            );
        }

        Ok(())
    }

    /// Moves to the follower role; a higher term clears the vote and the leader hint.
    /// Does not persist, returns true if the persistent state changed.
    pub(crate) fn step_down(&mut self, term: u64) -> bool {
        let term_changed = term > self.state.current_term;
        if term_changed {
            self.state.current_term = term;
            self.state.voted_for_id = None;
            self.current_leader_id = None;
        }

        if self.status != NodeStatus::Follower {
            info!(
                "Node {} changed status {} to Follower in term {}",
                self.id, self.status, self.state.current_term
            );
        }

        self.status = NodeStatus::Follower;
        self.votes_granted.clear();
        self.clear_leader_state();

        term_changed
    }

    /// Steps down and persists the new term if it changed.
    pub(crate) fn become_follower(&mut self, term: u64) -> Result<()> {
        if self.step_down(term) {
            self.persist()?;
        }

        Ok(())
    }

    pub(crate) fn become_leader(&mut self) {
        info!(
            "Node {} became the leader in term {} with votes from {:?}",
            self.id, self.state.current_term, self.votes_granted
        );

        self.status = NodeStatus::Leader;
        self.current_leader_id = Some(self.id);
        self.votes_granted.clear();
        self.clear_leader_state();

        let next_index = self.state.log.get_last_entry_index() + 1;
        for peer_id in self.peers() {
            self.next_index.insert(peer_id, next_index);
            self.match_index.insert(peer_id, 0);
        }
    }

    fn clear_leader_state(&mut self) {
        self.next_index.clear();
        self.match_index.clear();
        self.replication_in_flight.clear();
    }

    /// Candidate log is at least as up to date: higher last term wins, equal terms compare length.
    pub(crate) fn is_candidate_log_up_to_date(
        &self,
        candidate_last_log_term: u64,
        candidate_last_log_index: u64,
    ) -> bool {
        let last_term = self.state.log.get_last_entry_term();
        let last_index = self.state.log.get_last_entry_index();

        (candidate_last_log_term, candidate_last_log_index) >= (last_term, last_index)
    }

    pub(crate) fn next_index_of(&self, peer_id: u64) -> u64 {
        self.next_index
            .get(&peer_id)
            .copied()
            .unwrap_or_else(|| self.state.log.get_last_entry_index() + 1)
    }

    pub(crate) fn match_index_of(&self, peer_id: u64) -> u64 {
        self.match_index.get(&peer_id).copied().unwrap_or(0)
    }

    pub fn status_response(&self) -> NodeStatusResponse {
        NodeStatusResponse {
            node_id: self.id,
            term: self.state.current_term,
            status: self.status,
            commit_index: self.commit_index,
            last_applied: self.last_applied,
            last_log_index: self.state.log.get_last_entry_index(),
            current_leader: self.current_leader_id,
        }
    }
}
