//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for the remote storage backend. The
//! primary implementation targets Google Drive, but the trait is written
//! provider-agnostic: containers, items, and opaque identifiers.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - The store is shared read-only across concurrent upload tasks; all
//!   methods take `&self` and implementations must be safe to call
//!   concurrently.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::RemoteId;

// ============================================================================
// ProgressFn
// ============================================================================

/// Progress callback invoked with `(bytes_sent, total_bytes)` after each
/// chunk of a resumable transfer
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

// ============================================================================
// RemoteFolder
// ============================================================================

/// A resolved or newly created remote folder
///
/// Port-level DTO produced by folder lookup/creation and consumed as the
/// parent reference of subsequent create calls. Not cached anywhere; its
/// lifetime is the call chain that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    /// Provider-assigned opaque identifier
    pub id: RemoteId,
    /// Folder name as stored remotely
    pub name: String,
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for remote storage operations
///
/// The four operations the upload engine needs: folder lookup, folder
/// creation, and the two transfer shapes. Implementations handle the
/// provider-specific wire protocol, authentication headers, and error
/// mapping.
///
/// ## Implementation Notes
///
/// - `find_folders` must return matches ordered by creation time (oldest
///   first) so that callers picking the first match behave
///   deterministically when duplicate names exist.
/// - A lookup with no matches is an empty `Vec`, not an error.
/// - The `progress` callback in `upload_resumable` is called with
///   `(bytes_sent, total_bytes)` after each acknowledged chunk and must not
///   block for long.
/// - Errors are propagated after a single attempt; implementations do not
///   retry internally.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Creates a folder-typed item under the given parent
    ///
    /// # Arguments
    /// * `name` - The folder name
    /// * `parent` - Parent folder ID, or `None` for the provider root
    ///
    /// # Returns
    /// A reference to the newly created folder
    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> anyhow::Result<RemoteFolder>;

    /// Finds folders matching `name` exactly under the given parent
    ///
    /// Scoped to `parent` (or the provider root for `None`); never matches
    /// across other parents. Results are ordered by creation time, oldest
    /// first.
    ///
    /// # Returns
    /// All matching folders; empty when none exist
    async fn find_folders(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> anyhow::Result<Vec<RemoteFolder>>;

    /// Uploads a small payload in a single request
    ///
    /// # Arguments
    /// * `data` - The file contents
    /// * `name` - The remote file name
    /// * `content_type` - MIME type for the payload
    /// * `parent` - The folder the file is created in
    ///
    /// # Returns
    /// The remote ID of the created file
    async fn upload_simple(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
        parent: &RemoteId,
    ) -> anyhow::Result<RemoteId>;

    /// Uploads a payload through a chunked, resumable session
    ///
    /// Used for payloads above the simple-transfer limit. Invokes
    /// `progress` with `(bytes_sent, total_bytes)` after each chunk.
    ///
    /// # Arguments
    /// * `data` - The file contents
    /// * `name` - The remote file name
    /// * `content_type` - MIME type for the payload
    /// * `parent` - The folder the file is created in
    /// * `progress` - Optional callback reporting (bytes_sent, total_bytes)
    ///
    /// # Returns
    /// The remote ID of the created file
    async fn upload_resumable(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
        parent: &RemoteId,
        progress: Option<ProgressFn>,
    ) -> anyhow::Result<RemoteId>;
}

// ============================================================================
// Tests
// ============================================================================
