//! Local filesystem entry snapshots and transfer strategy selection
//!
//! A [`LocalEntry`] is the immutable view of a path taken at classification
//! time: the orchestrator stats a path exactly once, captures kind and size
//! here, and never refreshes the snapshot. [`TransferStrategy`] is the
//! size-based choice between a single-request upload and a chunked session.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// EntryKind
// ============================================================================

/// Kind of a local entry, captured at classification time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or anything stat reports as non-directory)
    File,
    /// Directory
    Directory,
}

// ============================================================================
// LocalEntry
// ============================================================================

/// Snapshot of a local filesystem entry at orchestration time
///
/// Read once from the filesystem when the entry is classified; never
/// mutated afterwards. `size_bytes` is meaningful for files only and is
/// zero for directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    path: PathBuf,
    kind: EntryKind,
    size_bytes: u64,
}

impl LocalEntry {
    /// Create a file entry with a known size
    #[must_use]
    pub fn file(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size_bytes,
        }
    }

    /// Create a directory entry
    #[must_use]
    pub fn directory(path: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            size_bytes: 0,
        }
    }

    /// Build an entry from a path and its stat result
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        if metadata.is_dir() {
            Self::directory(path)
        } else {
            Self::file(path, metadata.len())
        }
    }

    /// The absolute local path of this entry
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The kind captured at classification time
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Whether this entry is a directory
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Size in bytes (zero for directories)
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// The entry's name as it should appear remotely (the final path
    /// component). `None` for paths without a terminal component.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

// ============================================================================
// TransferStrategy
// ============================================================================

/// Upload strategy selected by payload size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStrategy {
    /// Single-request transfer for small payloads
    Simple,
    /// Chunked session transfer with progress reporting
    Resumable,
}

impl TransferStrategy {
    /// Select the strategy for a payload of `size_bytes` against `limit_bytes`
    ///
    /// The comparison is `size > limit`: payloads at or below the limit use
    /// [`TransferStrategy::Simple`], strictly larger ones use
    /// [`TransferStrategy::Resumable`]. Zero-byte payloads are always Simple.
    #[must_use]
    pub fn select(size_bytes: u64, limit_bytes: u64) -> Self {
        if size_bytes > limit_bytes {
            Self::Resumable
        } else {
            Self::Simple
        }
    }
}

impl std::fmt::Display for TransferStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Resumable => write!(f, "resumable"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
