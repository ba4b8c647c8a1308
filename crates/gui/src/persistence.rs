//! Local snapshot files and per-model autosave

use std::path::{Path, PathBuf};

use shared::MeasurementSnapshot;
use thiserror::Error;

use crate::state::settings::project_dirs;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    Version(u32),
    #[error("no data directory available on this platform")]
    NoDataDir,
}

pub fn save_snapshot(snapshot: &MeasurementSnapshot, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<MeasurementSnapshot, PersistenceError> {
    let json = std::fs::read_to_string(path)?;
    let snapshot: MeasurementSnapshot = serde_json::from_str(&json)?;
    if snapshot.version > shared::SNAPSHOT_VERSION {
        return Err(PersistenceError::Version(snapshot.version));
    }
    Ok(snapshot)
}

/// File-system safe stem for a model name
fn autosave_stem(model_name: Option<&str>) -> String {
    let name = model_name.unwrap_or("untitled");
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}

/// Writes the session snapshot whenever its version moves
pub struct AutoSaver {
    dir: PathBuf,
    saved_version: Option<u64>,
}

impl AutoSaver {
    /// Autosaves under the platform data directory
    pub fn new() -> Result<Self, PersistenceError> {
        let dirs = project_dirs().ok_or(PersistenceError::NoDataDir)?;
        Ok(Self::in_dir(dirs.data_dir().join("autosave")))
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            saved_version: None,
        }
    }

    pub fn path_for(&self, model_name: Option<&str>) -> PathBuf {
        self.dir.join(format!("{}.json", autosave_stem(model_name)))
    }

    /// Mark `version` as already on disk (after loading it)
    pub fn mark_saved(&mut self, version: u64) {
        self.saved_version = Some(version);
    }

    /// Save if `version` differs from the last saved one; returns true when written
    pub fn save_if_changed(
        &mut self,
        snapshot: &MeasurementSnapshot,
        version: u64,
    ) -> Result<bool, PersistenceError> {
        if self.saved_version == Some(version) {
            return Ok(false);
        }
        let path = self.path_for(snapshot.model.as_deref());
        save_snapshot(snapshot, &path)?;
        tracing::debug!("Autosaved {} measurement(s) to {:?}", snapshot.measurements.len(), path);
        self.saved_version = Some(version);
        Ok(true)
    }

    /// Autosaved snapshot of a model, if one exists
    pub fn load(&self, model_name: Option<&str>) -> Option<MeasurementSnapshot> {
        let path = self.path_for(model_name);
        if !path.exists() {
            return None;
        }
        match load_snapshot(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring autosave {:?}: {}", path, e);
                None
            }
        }
    }
}
