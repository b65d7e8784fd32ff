//! Transitive file-dependency tracking for incremental rebuilds.
//!
//! The external parser's include resolver calls [`DependencyTracker::record`]
//! for every file it opens; after a clean compile the recorded set is
//! persisted next to the effect source. A later build asks
//! [`DependencyTracker::check_for_changes`] whether any recorded file's
//! modification time drifted — and treats every I/O failure as "changed",
//! so a broken sidecar can only ever cause a rebuild, never a stale skip.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Errors persisting the dependency sidecar.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("failed to write dependency file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode dependency file: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// One recorded input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Resolved path (absolute when the file existed at record time).
    pub path: PathBuf,
    /// Modification time observed at record time; None if the path was not
    /// readable (in-memory sources pass paths that never hit disk).
    pub modified: Option<SystemTime>,
}

/// Records every file a compile invocation touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyTracker {
    records: Vec<DependencyRecord>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visited file, deduplicating by resolved path.
    pub fn record(&mut self, path: &Path) {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.records.iter().any(|r| r.path == resolved) {
            return;
        }
        let modified = std::fs::metadata(&resolved)
            .and_then(|meta| meta.modified())
            .ok();
        self.records.push(DependencyRecord {
            path: resolved,
            modified,
        });
    }

    /// Recorded files in record order.
    pub fn records(&self) -> &[DependencyRecord] {
        &self.records
    }

    /// Persist the recorded set to `path`.
    pub fn save(&self, path: &Path) -> Result<(), DependencyError> {
        let bytes = rmp_serde::to_vec_named(&self.records)?;
        std::fs::write(path, bytes).map_err(|source| DependencyError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// True if any input changed since the sidecar at `path` was written.
    ///
    /// Missing or undecodable sidecar, unreadable recorded files, and
    /// modification-time drift all answer `true`.
    pub fn check_for_changes(path: &Path) -> bool {
        let Ok(bytes) = std::fs::read(path) else {
            return true;
        };
        let Ok(records) = rmp_serde::from_slice::<Vec<DependencyRecord>>(&bytes) else {
            return true;
        };
        records.iter().any(|record| {
            let current = std::fs::metadata(&record.path)
                .and_then(|meta| meta.modified())
                .ok();
            current != record.modified
        })
    }

    /// Deterministic sidecar path for an effect source (`<source>.deps`).
    pub fn dependency_file_path_for(source: &Path) -> PathBuf {
        let mut name = source.as_os_str().to_owned();
        name.push(".deps");
        PathBuf::from(name)
    }
}
