use raft::{new_err, PersistentState, PersistentStore, RaftError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistent store keeping the node state as a JSON file.
/// Writes go to a temp file which is synced and renamed over the state file.
#[derive(Clone, Debug)]
pub struct FilePersistentStore {
    path: PathBuf,
}

impl FilePersistentStore {
    /// Creates the store for the state file path. Parent directories are created.
    pub fn new(path: impl Into<PathBuf>) -> Result<FilePersistentStore, RaftError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if let Err(err) = fs::create_dir_all(dir) {
                return new_err(
                    format!("Cannot create state directory {}", dir.display()),
                    err.to_string(),
                );
            }
        }

        Ok(FilePersistentStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn write_atomically(&self, contents: &[u8]) -> std::io::Result<()> {
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl PersistentStore for FilePersistentStore {
    fn save_state(&self, state: &PersistentState) -> Result<(), RaftError> {
        let json = match serde_json::to_vec(state) {
            Ok(json) => json,
            Err(err) => return new_err("Cannot serialize node state".to_string(), err.to_string()),
        };

        if let Err(err) = self.write_atomically(&json) {
            return new_err(
                format!("Cannot write node state to {}", self.path.display()),
                err.to_string(),
            );
        }

        trace!("Node state saved to {}: {}", self.path.display(), state);

        Ok(())
    }

    fn load_state(&self) -> Result<PersistentState, RaftError> {
        if !self.path.exists() {
            return Ok(PersistentState::default());
        }

        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                return new_err(
                    format!("Cannot read node state from {}", self.path.display()),
                    err.to_string(),
                )
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(state) => Ok(state),
            Err(err) => new_err(
                format!("Corrupted node state in {}", self.path.display()),
                err.to_string(),
            ),
        }
    }
}
