//! Module: store
//! Responsibility: load and persist the model snapshot file.
//!
//! Writes go to a temporary file in the target directory that is renamed
//! over the target, so a reader sees either the old or the new snapshot.

use crate::Error;
use flatschema_schema::snapshot::{ModelSnapshot, SnapshotError};
use serde::Serialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error as ThisError;

///
/// StoreError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("invalid JSON: {0}")]
    Format(#[source] serde_json::Error),

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(#[from] SnapshotError),

    #[error("cannot encode: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Load the snapshot at `path`; a missing file is an empty snapshot.
pub fn load_snapshot(path: &Path) -> Result<ModelSnapshot, Error> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no model file yet");
            return Ok(ModelSnapshot::new());
        }
        Err(source) => return Err(Error::io(path, source)),
    };

    let snapshot: ModelSnapshot = serde_json::from_str(&text)
        .map_err(|e| Error::store(path, StoreError::Format(e)))?;
    snapshot
        .validate()
        .map_err(|e| Error::store(path, StoreError::Inconsistent(e)))?;

    tracing::debug!(
        path = %path.display(),
        entities = snapshot.entities.len(),
        "loaded model file"
    );

    Ok(snapshot)
}

/// Persist the snapshot as pretty JSON, replacing `path` atomically.
pub fn write_snapshot(path: &Path, snapshot: &ModelSnapshot) -> Result<(), Error> {
    write_json(path, snapshot)?;
    tracing::info!(
        path = %path.display(),
        entities = snapshot.entities.len(),
        "wrote model file"
    );

    Ok(())
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    stage_json(path, value)?.commit()
}

///
/// Staged
/// Fully written and synced temporary file, not yet renamed over its target.
/// Dropping it removes the temporary file.
///

#[derive(Debug)]
pub(crate) struct Staged {
    file: NamedTempFile,
    path: PathBuf,
}

impl Staged {
    pub(crate) fn commit(self) -> Result<(), Error> {
        self.file
            .persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;

        Ok(())
    }
}

/// Encode `value` as pretty JSON into a temporary file next to `path`.
pub(crate) fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<Staged, Error> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| Error::store(path, StoreError::Serialize(e)))?;
    bytes.push(b'\n');

    stage(path, &bytes)
}

fn stage(path: &Path, bytes: &[u8]) -> Result<Staged, Error> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(bytes).map_err(|e| Error::io(file.path(), e))?;
    file.as_file().sync_all().map_err(|e| Error::io(file.path(), e))?;

    Ok(Staged {
        file,
        path: path.to_path_buf(),
    })
}

///
/// TESTS
///
