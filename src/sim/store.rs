//! Stage files on disk.
//!
//! ## Layout
//!   `<stages_dir>/<stageID>.json`, one pretty-printed JSON document per
//!   stage (field names as in `domain::stage`).
//!
//! Loading a stage that does not exist falls back to the first stage file
//! in sorted order, so a renamed or deleted stage still starts a round.
//! Saving validates first and never writes an invalid stage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::domain::stage::StageData;
use crate::domain::validate::{validate_stage, ValidationError};

const EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode stage {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stage {id} is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("no stage files in {0}")]
    NoStages(PathBuf),
}

#[derive(Clone, Debug)]
pub struct StageStore {
    dir: PathBuf,
}

impl StageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stage_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    /// Every stage file in the directory, sorted by path.
    /// A missing directory reads as empty.
    pub fn stage_paths(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return vec![],
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == EXTENSION))
            .collect();
        paths.sort();
        paths
    }

    /// Stage ids (file stems) in sorted order.
    pub fn stage_ids(&self) -> Vec<String> {
        self.stage_paths()
            .iter()
            .filter_map(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.stage_path(id).is_file()
    }

    /// Load `id`, or the first stage file when `id` has none.
    pub fn load(&self, id: &str) -> Result<StageData, StoreError> {
        let path = self.stage_path(id);
        if path.is_file() {
            return read_stage(&path);
        }

        let first = self
            .stage_paths()
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NoStages(self.dir.clone()))?;
        warn!("stage {id} not found; falling back to {}", first.display());
        read_stage(&first)
    }

    /// Validate and write `stage` to `<dir>/<stageID>.json`.
    pub fn save(&self, stage: &StageData) -> Result<PathBuf, StoreError> {
        validate_stage(stage).map_err(|source| StoreError::Invalid {
            id: stage.stage_id.clone(),
            source,
        })?;

        let text = serde_json::to_string_pretty(stage).map_err(|source| StoreError::Encode {
            id: stage.stage_id.clone(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.stage_path(&stage.stage_id);
        fs::write(&path, text).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        info!("saved stage {} to {}", stage.stage_id, path.display());
        Ok(path)
    }

    /// Remove a stage file. Deleting a stage that does not exist is fine.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.stage_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted stage {id}");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

fn read_stage(path: &Path) -> Result<StageData, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stage = serde_json::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("read stage file {}", path.display());
    Ok(stage)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
