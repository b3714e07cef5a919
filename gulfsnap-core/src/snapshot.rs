//! Snapshot persistence: latest plus dated archives

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::fields::FieldMap;
use crate::types::Symbol;

/// Full persisted state for one run: the run timestamp plus every tracked
/// instrument's field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub as_of: DateTime<Utc>,
    pub stocks: BTreeMap<Symbol, FieldMap>,
}

impl Snapshot {
    /// Starting state for a first run with no prior file.
    pub fn empty() -> Self {
        Self {
            as_of: DateTime::<Utc>::UNIX_EPOCH,
            stocks: BTreeMap::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Reads and writes snapshots under one output directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    out_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn latest_path(&self) -> PathBuf {
        self.out_dir.join("latest.json")
    }

    /// Archive path for the snapshot's UTC calendar date.
    pub fn archive_path(&self, snapshot: &Snapshot) -> PathBuf {
        self.out_dir
            .join(format!("{}.json", snapshot.as_of.format("%Y-%m-%d")))
    }

    /// Loads the prior "latest" snapshot. A missing file is an empty first
    /// run; an unreadable or unparseable file is an error so a bad state is
    /// never silently overwritten.
    pub async fn load_latest(&self) -> SnapshotResult<Snapshot> {
        let path = self.latest_path();
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No prior snapshot at {}, starting empty", path.display());
                return Ok(Snapshot::empty());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes the snapshot to `latest.json` and to its dated archive,
    /// overwriting both, creating the output directory if needed. Returns
    /// the two written paths.
    pub async fn persist(&self, snapshot: &Snapshot) -> SnapshotResult<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.out_dir).await?;
        let payload = serde_json::to_string_pretty(snapshot)?;
        let latest = self.latest_path();
        let archive = self.archive_path(snapshot);
        fs::write(&latest, &payload).await?;
        fs::write(&archive, &payload).await?;
        Ok((latest, archive))
    }
}
