use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{new_err, RaftError};
use crate::node::configuration::Cluster;
use crate::node::state::{Node, PersistentState, PersistentStore};
use crate::operation_log::LogEntry;
use crate::rsm::ReplicatedStateMachine;

#[derive(Debug, Clone, Default)]
pub struct MockRsm {
    pub applied: Arc<Mutex<Vec<LogEntry>>>,
    pub fail: Arc<AtomicBool>,
}

impl MockRsm {
    pub fn applied_indexes(&self) -> Vec<u64> {
        self.applied.lock().unwrap().iter().map(|e| e.index).collect()
    }

    pub fn applied_entries(&self) -> Vec<LogEntry> {
        self.applied.lock().unwrap().clone()
    }
}

impl ReplicatedStateMachine for MockRsm {
    fn apply_entry(&mut self, entry: &LogEntry) -> Result<(), RaftError> {
        if self.fail.load(Ordering::SeqCst) {
            return new_err("Mock rsm failure".to_string(), String::new());
        }
        self.applied.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockStore {
    pub state: Arc<Mutex<PersistentState>>,
    pub fail: Arc<AtomicBool>,
    pub saves: Arc<AtomicU64>,
}

impl MockStore {
    pub fn with_state(state: PersistentState) -> MockStore {
        let store = MockStore::default();
        *store.state.lock().unwrap() = state;
        store
    }

    pub fn saved(&self) -> PersistentState {
        self.state.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl PersistentStore for MockStore {
    fn save_state(&self, state: &PersistentState) -> Result<(), RaftError> {
        if self.fail.load(Ordering::SeqCst) {
            return new_err("Mock store failure".to_string(), String::new());
        }
        *self.state.lock().unwrap() = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_state(&self) -> Result<PersistentState, RaftError> {
        Ok(self.state.lock().unwrap().clone())
    }
}

#[derive(Clone, Debug)]
pub struct MockCluster {
    pub nodes: Vec<u64>,
}

impl Cluster for MockCluster {
    fn quorum_size(&self) -> u32 {
        self.nodes.len() as u32 / 2 + 1
    }

    fn all_nodes(&self) -> Vec<u64> {
        self.nodes.clone()
    }

    fn peers(&self, node_id: u64) -> Vec<u64> {
        self.nodes.iter().cloned().filter(|id| *id != node_id).collect()
    }
}

pub type MockNode = Node<MockRsm, MockStore, MockCluster>;

pub fn create_node_with_store(id: u64, node_count: u64, store: MockStore) -> (MockNode, MockRsm) {
    let rsm = MockRsm::default();
    let cluster = MockCluster {
        nodes: (1..=node_count).collect(),
    };
    let node = Node::new(id, cluster, rsm.clone(), store, 64).unwrap();

    (node, rsm)
}

pub fn create_node(id: u64, node_count: u64) -> (MockNode, MockStore, MockRsm) {
    let store = MockStore::default();
    let (node, rsm) = create_node_with_store(id, node_count, store.clone());

    (node, store, rsm)
}

pub fn entry(index: u64, term: u64) -> LogEntry {
    LogEntry {
        index,
        term,
        data: vec![index as u8, term as u8],
    }
}

/// Persistent state with a log of the provided entry terms.
pub fn state_with_log(current_term: u64, terms: &[u64]) -> PersistentState {
    let mut state = PersistentState {
        current_term,
        ..PersistentState::default()
    };
    for term in terms {
        let index = state.log.get_last_entry_index() + 1;
        state.log.append_new_entry(*term, vec![index as u8, *term as u8]);
    }
    state
}
