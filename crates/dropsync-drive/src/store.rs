//! DriveStore - IRemoteStore implementation for the Google Drive API
//!
//! Wraps the [`DriveClient`] and delegates to the [`files`](crate::files)
//! module to fulfil the [`IRemoteStore`] port contract.
//!
//! ## Design Notes
//!
//! - The wrapped [`DriveClient`] is immutable after construction, so the
//!   store needs no interior locking and concurrent transfers proceed in
//!   parallel over the shared connection pool.
//! - Authentication is handled separately by
//!   [`DriveAuthAdapter`](crate::auth::DriveAuthAdapter); the store assumes
//!   a valid access token and surfaces 401s as errors.
//! - Item IDs returned by Drive are validated into [`RemoteId`] before they
//!   cross the port boundary.

use anyhow::{Context, Result};
use tracing::debug;

use dropsync_core::domain::RemoteId;
use dropsync_core::ports::remote_store::{IRemoteStore, ProgressFn, RemoteFolder};

use crate::client::DriveClient;
use crate::files::{self, DriveItem};

// ============================================================================
// DriveStore
// ============================================================================

/// Remote store implementation that delegates to the Google Drive API
pub struct DriveStore {
    /// The underlying Drive API client
    client: DriveClient,
    /// Chunk size for resumable sessions, in bytes
    chunk_size: usize,
}

impl DriveStore {
    /// Creates a new `DriveStore` wrapping the given [`DriveClient`]
    ///
    /// Resumable sessions use [`files::DEFAULT_CHUNK_SIZE`] unless
    /// overridden with [`with_chunk_size`](Self::with_chunk_size).
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            chunk_size: files::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the resumable chunk size in bytes
    ///
    /// Must be a positive multiple of 256 KiB per the Drive API contract.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Validates a Drive item into the port-level folder DTO
fn item_to_folder(item: DriveItem) -> Result<RemoteFolder> {
    let id = RemoteId::new(item.id).context("Drive returned an invalid folder ID")?;
    Ok(RemoteFolder {
        id,
        name: item.name,
    })
}

#[async_trait::async_trait]
impl IRemoteStore for DriveStore {
    /// Creates a folder via a metadata-only insert
    ///
    /// Delegates to [`files::create_folder`].
    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<RemoteFolder> {
        debug!(
            name,
            parent = parent.map(RemoteId::as_str).unwrap_or("root"),
            "DriveStore::create_folder"
        );
        let item =
            files::create_folder(&self.client, name, parent.map(RemoteId::as_str)).await?;
        item_to_folder(item)
    }

    /// Finds folders matching `name` exactly under the given parent
    ///
    /// Delegates to [`files::list_folders`], which follows pagination and
    /// returns matches ordered by creation time.
    async fn find_folders(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<Vec<RemoteFolder>> {
        debug!(
            name,
            parent = parent.map(RemoteId::as_str).unwrap_or("root"),
            "DriveStore::find_folders"
        );
        let items =
            files::list_folders(&self.client, name, parent.map(RemoteId::as_str)).await?;
        items.into_iter().map(item_to_folder).collect()
    }

    /// Uploads a small payload in a single multipart request
    ///
    /// Delegates to [`files::upload_multipart`].
    async fn upload_simple(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
        parent: &RemoteId,
    ) -> Result<RemoteId> {
        debug!(
            name,
            content_type,
            size = data.len(),
            parent = %parent,
            "DriveStore::upload_simple"
        );
        let item =
            files::upload_multipart(&self.client, name, content_type, parent.as_str(), data)
                .await?;
        RemoteId::new(item.id).context("Drive returned an invalid file ID")
    }

    /// Uploads a payload through a chunked, resumable session
    ///
    /// Delegates to [`files::upload_resumable`] with the configured chunk size.
    async fn upload_resumable(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
        parent: &RemoteId,
        progress: Option<ProgressFn>,
    ) -> Result<RemoteId> {
        debug!(
            name,
            content_type,
            size = data.len(),
            parent = %parent,
            "DriveStore::upload_resumable"
        );
        let item = files::upload_resumable(
            &self.client,
            name,
            content_type,
            parent.as_str(),
            data,
            self.chunk_size,
            progress,
        )
        .await?;
        RemoteId::new(item.id).context("Drive returned an invalid file ID")
    }
}

// ============================================================================
// Tests
// ============================================================================
