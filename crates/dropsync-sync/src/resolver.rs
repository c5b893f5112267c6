//! Remote folder resolution
//!
//! The [`FolderResolver`] finds or creates a remote folder by exact name
//! under an optional parent. Lookups are parent-scoped and rely on the
//! store returning matches ordered by creation time, so duplicate names
//! resolve deterministically to the oldest folder.
//!
//! ## Design Notes
//!
//! - Creation is serialized per `(parent, name)` key through a keyed async
//!   mutex, so concurrent callers resolving the same missing folder create
//!   exactly one remote container.
//! - The resolver memoizes nothing: every call queries the store, and the
//!   key locks are the only state it holds.

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use dropsync_core::domain::{DomainError, RemoteId};
use dropsync_core::ports::{IRemoteStore, RemoteFolder};

/// Key identifying one folder slot: parent id (None for the root) and name
type FolderKey = (Option<String>, String);

// ============================================================================
// FolderResolver
// ============================================================================

/// Finds or creates remote folders by name under a parent
pub struct FolderResolver {
    /// The remote store used for lookup and creation
    store: Arc<dyn IRemoteStore>,
    /// Per-(parent, name) creation locks
    ///
    /// Entries are retained for the resolver's lifetime; the set of folder
    /// names seen in one run is small.
    creation_locks: DashMap<FolderKey, Arc<Mutex<()>>>,
}

impl FolderResolver {
    /// Creates a new resolver backed by the given store
    pub fn new(store: Arc<dyn IRemoteStore>) -> Self {
        Self {
            store,
            creation_locks: DashMap::new(),
        }
    }

    /// Resolves a folder by name under `parent`, creating it when missing
    ///
    /// The lookup-then-create sequence runs under the key lock for
    /// `(parent, name)`, so two concurrent calls for the same missing
    /// folder produce one creation and one lookup hit.
    ///
    /// # Arguments
    /// * `name` - Exact folder name to resolve
    /// * `parent` - Parent folder id, or `None` for the store root
    ///
    /// # Returns
    /// The existing folder (oldest match when names collide) or the newly
    /// created one
    ///
    /// # Errors
    /// Returns an error for an empty name, a lookup transport failure
    /// (creation is not attempted), or a creation failure
    pub async fn resolve_or_create(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<RemoteFolder> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidFolderName(
                "folder name cannot be empty".to_string(),
            )
            .into());
        }

        let key: FolderKey = (
            parent.map(|p| p.as_str().to_string()),
            name.to_string(),
        );
        let lock = {
            let entry = self
                .creation_locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let _guard = lock.lock().await;

        let matches = self.store.find_folders(name, parent).await?;
        if let Some(existing) = matches.into_iter().next() {
            debug!(
                name,
                remote_id = %existing.id,
                "Resolved existing folder"
            );
            return Ok(existing);
        }

        info!(
            name,
            parent = parent.map(RemoteId::as_str).unwrap_or("root"),
            "Creating remote folder"
        );
        let created = self.store.create_folder(name, parent).await?;
        debug!(name, remote_id = %created.id, "Folder created");
        Ok(created)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
