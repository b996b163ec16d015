use crate::condition::Condition;
use crate::cursor::CursorState;
use crate::error::PersistenceError;
use crate::io;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable image of the cursor position and the whole registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub cursor: CursorState,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Snapshot {
    pub fn new(cursor: CursorState, conditions: Vec<Condition>, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            cursor,
            conditions,
        }
    }
}

/// A single JSON file replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let Some(data) = io::read_if_exists(&self.path)? else {
            return Ok(None);
        };
        let snapshot: Snapshot = serde_json::from_str(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        io::atomic_write(&self.path, &data)?;
        Ok(())
    }
}
