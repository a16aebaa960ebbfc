//! Store snapshot persistence with file locking.
//!
//! The CLI keeps the whole record store in one JSON snapshot file. Loads
//! degrade to an empty store on missing or corrupt files; saves go through
//! a locked temp file and an atomic rename.

use crate::error::{Error, Result};
use crate::types::{Medication, Occurrence};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialized contents of a record store
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl StoreSnapshot {
    /// Load a snapshot from a file with shared locking
    ///
    /// Returns an empty snapshot if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty
    /// snapshot rather than failing startup.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No snapshot file found, starting with an empty store");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open snapshot file {:?}: {}. Starting empty.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock snapshot file {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read snapshot file {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<StoreSnapshot>(&contents) {
            Ok(snapshot) => {
                tracing::debug!(
                    "Loaded {} medications and {} occurrences from {:?}",
                    snapshot.medications.len(),
                    snapshot.occurrences.len(),
                    path
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse snapshot file {:?}: {}. Starting empty.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the snapshot to a file with exclusive locking
    ///
    /// Atomically writes the snapshot by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old snapshot file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store snapshot to {:?}", path);
        Ok(())
    }
}
