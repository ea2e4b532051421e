//! Saved runs and the highscore, stored as JSON files.
//!
//! A run save is a snapshot of the playfield: the level name, the score,
//! the camera, and one record per surviving entity keyed by its registry
//! name. The highscore lives in its own file so wiping a run never wipes
//! the record.
//!
//! A missing file is a normal condition (`Ok(None)`); a file that exists
//! but fails to parse is [`SaveError::Corrupted`], which callers report
//! and then treat as missing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SaveError;

const RUN_FILE: &str = "driftbelt_save.json";
const HIGHSCORE_FILE: &str = "driftbelt_highscore.json";

/// One persisted entity: the registry key that respawns it plus the
/// fields that spawner needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub key: String,
    pub fields: Value,
}

/// A snapshot of a run in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecord {
    pub level: String,
    pub score: u64,
    pub camera: [f32; 2],
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HighscoreRecord {
    best: u64,
}

/// Reads and writes the run save and the highscore.
pub struct SaveStore {
    run_path: PathBuf,
    highscore_path: PathBuf,
}

impl SaveStore {
    /// A store using the working directory, as the game does.
    pub fn new() -> Self {
        Self::at(Path::new("."))
    }

    /// A store rooted at `dir`.
    pub fn at(dir: &Path) -> Self {
        Self {
            run_path: dir.join(RUN_FILE),
            highscore_path: dir.join(HIGHSCORE_FILE),
        }
    }

    /// Loads the saved run, if one exists.
    pub fn load_run(&self) -> Result<Option<SaveRecord>, SaveError> {
        let bytes = match fs::read(&self.run_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| SaveError::Corrupted(e.to_string()))?;
        Ok(Some(record))
    }

    pub fn save_run(&self, record: &SaveRecord) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| SaveError::Corrupted(e.to_string()))?;
        fs::write(&self.run_path, json)?;
        debug!(level = %record.level, entities = record.entities.len(), "Wrote run save");
        Ok(())
    }

    /// Removes the saved run. Nothing to remove is fine.
    pub fn clear_run(&self) -> Result<(), SaveError> {
        match fs::remove_file(&self.run_path) {
            Ok(()) => {
                debug!("Cleared run save");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the best score, 0 when none has been recorded yet.
    pub fn load_highscore(&self) -> Result<u64, SaveError> {
        let bytes = match fs::read(&self.highscore_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let record: HighscoreRecord = serde_json::from_slice(&bytes).map_err(|e| SaveError::Corrupted(e.to_string()))?;
        Ok(record.best)
    }

    pub fn save_highscore(&self, best: u64) -> Result<(), SaveError> {
        let json =
            serde_json::to_string_pretty(&HighscoreRecord { best }).map_err(|e| SaveError::Corrupted(e.to_string()))?;
        fs::write(&self.highscore_path, json)?;
        debug!(best, "Wrote highscore");
        Ok(())
    }
}

impl Default for SaveStore {
    fn default() -> Self {
        Self::new()
    }
}
