//! Snapshot persistence.
//!
//! [`SnapshotStore`] is the only seam between the hub and durable storage:
//! load the latest snapshot of a project, save a new one with a version
//! one past the previous. [`MemoryStore`] backs the tests; [`FileStore`]
//! keeps versioned JSON blobs on disk.

use std::future::Future;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::document::Document;
use crate::errors::Result;

pub trait SnapshotStore: Send + Sync + 'static {
    /// Loads the latest snapshot of a project, or `None` for a project
    /// that has never been saved.
    fn load(&self, project_id: &str) -> impl Future<Output = Result<Option<Document>>> + Send;

    /// Persists a new snapshot and returns its version (monotone per
    /// project, starting at 1).
    fn save(&self, project_id: &str, document: &Document)
    -> impl Future<Output = Result<u64>> + Send;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Keeps snapshots in a process-local map. Used by tests and as the
/// default for ephemeral deployments.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, (u64, Document)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest persisted version of a project, 0 when never saved.
    #[must_use]
    pub fn version(&self, project_id: &str) -> u64 {
        self.entries
            .lock()
            .get(project_id)
            .map_or(0, |(version, _)| *version)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, project_id: &str) -> impl Future<Output = Result<Option<Document>>> + Send {
        let document = self
            .entries
            .lock()
            .get(project_id)
            .map(|(_, document)| document.clone());
        async move { Ok(document) }
    }

    fn save(
        &self,
        project_id: &str,
        document: &Document,
    ) -> impl Future<Output = Result<u64>> + Send {
        let mut entries = self.entries.lock();
        let version = entries.get(project_id).map_or(0, |(v, _)| *v) + 1;
        let mut snapshot = document.clone();
        snapshot.version = version;
        entries.insert(project_id.to_string(), (version, snapshot));
        async move { Ok(version) }
    }
}

// ============================================================================
// File store
// ============================================================================

/// Versioned JSON snapshots under `<base>/<project_id>/snapshot-v<N>.json`.
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn project_dir(&self, project_id: &str) -> PathBuf {
        self.base.join(project_id)
    }
}

async fn latest_version(dir: &Path) -> Result<u64> {
    let mut latest = 0u64;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(version) = name
            .strip_prefix("snapshot-v")
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|v| v.parse::<u64>().ok())
        {
            latest = latest.max(version);
        }
    }
    Ok(latest)
}

impl SnapshotStore for FileStore {
    fn load(&self, project_id: &str) -> impl Future<Output = Result<Option<Document>>> + Send {
        let dir = self.project_dir(project_id);
        async move {
            let version = latest_version(&dir).await?;
            if version == 0 {
                return Ok(None);
            }
            let path = dir.join(format!("snapshot-v{version}.json"));
            let bytes = tokio::fs::read(&path).await?;
            let json = String::from_utf8_lossy(&bytes);
            let document = Document::from_json(&json)?;
            log::debug!("loaded snapshot v{version} from {}", path.display());
            Ok(Some(document))
        }
    }

    fn save(
        &self,
        project_id: &str,
        document: &Document,
    ) -> impl Future<Output = Result<u64>> + Send {
        let dir = self.project_dir(project_id);
        let mut snapshot = document.clone();
        async move {
            tokio::fs::create_dir_all(&dir).await?;
            let version = latest_version(&dir).await? + 1;
            snapshot.version = version;
            let path = dir.join(format!("snapshot-v{version}.json"));
            let json = serde_json::to_vec(&snapshot)?;
            tokio::fs::write(&path, json).await?;
            log::debug!("saved snapshot v{version} to {}", path.display());
            Ok(version)
        }
    }
}
