//! Upload orchestration engine
//!
//! The [`UploadOrchestrator`] turns one local entry into its remote mirror:
//! files are classified, content-typed, and uploaded with a size-selected
//! strategy; directories get a remote container and a concurrent fan-out
//! over their children.
//!
//! ## Entry lifecycle
//!
//! ```text
//! Pending ──→ Classifying ──→ FilePhase ───→ Completed | Failed
//!                        └──→ FolderPhase ─→ Completed | Failed
//! ```
//!
//! ## Design Notes
//!
//! - Every remote call (folder resolve, upload) runs under a permit from a
//!   bounded transfer pool. Permits are released before a directory joins
//!   its children, so nested fan-out cannot exhaust the pool.
//! - A directory's container exists before any child task is spawned, and
//!   the directory's report is not produced until every child reached a
//!   terminal state.
//! - Child failures are carried in the directory's report but do not fail
//!   the directory itself; only container creation or listing failures do.
//! - Remote calls race against the cancellation token; a cancelled entry
//!   reports `Failed` with a cancellation reason.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dropsync_core::config::Config;
use dropsync_core::domain::{ContentTypeResolver, LocalEntry, RemoteId, TransferStrategy};
use dropsync_core::ports::{IDecisionPrompt, IRemoteStore, ProgressFn, RemoteFolder};

use crate::resolver::FolderResolver;

/// Builds a per-file progress callback for resumable transfers
///
/// Invoked once per file when a resumable upload starts; the returned
/// callback receives `(bytes_sent, total_bytes)` after each chunk.
pub type ProgressFactory = Arc<dyn Fn(&Path) -> ProgressFn + Send + Sync>;

// ============================================================================
// UploadReport
// ============================================================================

/// Terminal outcome of one orchestration invocation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The file was uploaded
    Uploaded {
        /// Remote id of the created file
        remote_id: RemoteId,
        /// Strategy the size threshold selected
        strategy: TransferStrategy,
    },
    /// The directory's container exists; children carry their own outcomes
    FolderCreated {
        /// The resolved or newly created container
        folder: RemoteFolder,
        /// One report per immediate child, in listing order
        children: Vec<UploadReport>,
    },
    /// The entry could not be mirrored
    Failed {
        /// Rendered cause chain
        reason: String,
    },
}

/// Report for one local entry, including nested child reports
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// The local path this report describes
    pub path: PathBuf,
    /// What happened to it
    pub outcome: UploadOutcome,
}

impl UploadReport {
    pub(crate) fn failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            outcome: UploadOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Whether this entry itself reached a successful terminal state
    ///
    /// A directory counts as succeeded even when children failed; check
    /// [`failure_count`](Self::failure_count) for the subtree.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, UploadOutcome::Failed { .. })
    }

    /// Number of failed entries in this report's subtree, including itself
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match &self.outcome {
            UploadOutcome::Failed { .. } => 1,
            UploadOutcome::Uploaded { .. } => 0,
            UploadOutcome::FolderCreated { children, .. } => {
                children.iter().map(UploadReport::failure_count).sum()
            }
        }
    }

    /// Number of files uploaded in this report's subtree
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        match &self.outcome {
            UploadOutcome::Uploaded { .. } => 1,
            UploadOutcome::Failed { .. } => 0,
            UploadOutcome::FolderCreated { children, .. } => {
                children.iter().map(UploadReport::uploaded_count).sum()
            }
        }
    }
}

// ============================================================================
// UploadOrchestrator
// ============================================================================

/// Recursive upload engine
///
/// ## Dependencies
///
/// - `store`: remote folder and upload operations
/// - `prompt`: post-upload local-delete confirmation
/// - `config`: size threshold, pool size, cleanup policy, content types
pub struct UploadOrchestrator {
    /// Remote store shared by all concurrent tasks
    store: Arc<dyn IRemoteStore>,
    /// Keyed find-or-create for remote folders
    resolver: FolderResolver,
    /// Extension to MIME type mapping (builtins plus config overrides)
    content_types: ContentTypeResolver,
    /// Local-delete confirmation prompt
    prompt: Arc<dyn IDecisionPrompt>,
    /// Bounded pool gating every remote call
    transfer_pool: Arc<Semaphore>,
    /// Files strictly larger than this use the resumable strategy
    simple_limit: u64,
    /// Whether to offer local deletion after a successful upload
    prompt_delete: bool,
    /// Optional per-file progress callback factory
    progress: Option<ProgressFactory>,
    /// Cooperative shutdown signal
    cancel: CancellationToken,
}

impl UploadOrchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    /// * `store` - Remote store implementation
    /// * `prompt` - Decision prompt for post-upload cleanup
    /// * `config` - Application configuration
    /// * `cancel` - Token that aborts in-flight remote calls when cancelled
    pub fn new(
        store: Arc<dyn IRemoteStore>,
        prompt: Arc<dyn IDecisionPrompt>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            resolver: FolderResolver::new(Arc::clone(&store)),
            store,
            content_types: ContentTypeResolver::with_overrides(
                config.content_types.overrides.clone(),
            ),
            prompt,
            transfer_pool: Arc::new(Semaphore::new(config.transfers.max_concurrent as usize)),
            simple_limit: config.transfers.simple_limit_bytes(),
            prompt_delete: config.cleanup.prompt_delete,
            progress: None,
            cancel,
        }
    }

    /// Installs a progress callback factory for resumable transfers
    #[must_use]
    pub fn with_progress(mut self, factory: ProgressFactory) -> Self {
        self.progress = Some(factory);
        self
    }

    /// Resolves a top-level destination folder by name at the store root
    ///
    /// Used once per watcher event (and by one-shot uploads) to turn the
    /// chosen destination name into the parent for orchestration.
    pub async fn resolve_destination(&self, name: &str) -> Result<RemoteFolder> {
        let _permit = self.acquire_permit().await?;
        self.with_cancel(self.resolver.resolve_or_create(name, None))
            .await
    }

    /// Mirrors one local entry into the remote parent
    ///
    /// Never returns an error: every failure mode is encoded in the
    /// report so sibling and ancestor processing can continue.
    pub async fn process(self: Arc<Self>, path: &Path, parent: &RemoteId) -> UploadReport {
        self.process_entry(path.to_path_buf(), parent.clone()).await
    }

    /// Classification step; boxed because directories recurse through it
    fn process_entry(
        self: Arc<Self>,
        path: PathBuf,
        parent: RemoteId,
    ) -> BoxFuture<'static, UploadReport> {
        async move {
            if self.cancel.is_cancelled() {
                return UploadReport::failed(path, "cancelled before processing began");
            }

            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Cannot stat entry");
                    return UploadReport::failed(path, format!("cannot stat entry: {err}"));
                }
            };
            let entry = LocalEntry::from_metadata(path, &metadata);

            if entry.is_directory() {
                self.process_directory(entry, parent).await
            } else {
                self.process_file(entry, parent).await
            }
        }
        .boxed()
    }

    // ========================================================================
    // FilePhase
    // ========================================================================

    async fn process_file(&self, entry: LocalEntry, parent: RemoteId) -> UploadReport {
        let path = entry.path().to_path_buf();
        let name = match entry.name() {
            Some(name) => name,
            None => return UploadReport::failed(path, "entry has no file name"),
        };

        let content_type = self.content_types.resolve(entry.path()).to_string();
        let strategy = TransferStrategy::select(entry.size_bytes(), self.simple_limit);
        debug!(
            path = %path.display(),
            size = entry.size_bytes(),
            %strategy,
            content_type,
            "Classified file"
        );

        // Deleted between notification and open is a per-entry failure
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(err) => {
                return UploadReport::failed(path, format!("cannot read file: {err}"));
            }
        };

        match self
            .upload_file(&data, &name, &content_type, &parent, strategy, &path)
            .await
        {
            Ok(remote_id) => {
                info!(path = %path.display(), %remote_id, %strategy, "Upload completed");
                self.run_cleanup(&path).await;
                UploadReport {
                    path,
                    outcome: UploadOutcome::Uploaded {
                        remote_id,
                        strategy,
                    },
                }
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = format!("{err:#}"),
                    "Upload failed"
                );
                UploadReport::failed(path, format!("{err:#}"))
            }
        }
    }

    /// Runs the strategy-selected upload under a transfer-pool permit
    async fn upload_file(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
        parent: &RemoteId,
        strategy: TransferStrategy,
        path: &Path,
    ) -> Result<RemoteId> {
        let _permit = self.acquire_permit().await?;
        match strategy {
            TransferStrategy::Simple => {
                self.with_cancel(self.store.upload_simple(data, name, content_type, parent))
                    .await
            }
            TransferStrategy::Resumable => {
                let progress = self.progress.as_ref().map(|factory| factory(path));
                self.with_cancel(
                    self.store
                        .upload_resumable(data, name, content_type, parent, progress),
                )
                .await
            }
        }
    }

    /// Post-upload local cleanup decision point
    ///
    /// A removal or prompt error never downgrades the entry's outcome;
    /// the upload already succeeded.
    async fn run_cleanup(&self, path: &Path) {
        if !self.prompt_delete {
            debug!(path = %path.display(), "Keeping local file (cleanup prompts disabled)");
            return;
        }

        match self.prompt.confirm_local_delete(path).await {
            Ok(true) => match tokio::fs::remove_file(path).await {
                Ok(()) => info!(path = %path.display(), "Removed local file after upload"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Could not remove local file");
                }
            },
            Ok(false) => debug!(path = %path.display(), "Keeping local file"),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = format!("{err:#}"),
                    "Delete confirmation failed, keeping file"
                );
            }
        }
    }

    // ========================================================================
    // FolderPhase
    // ========================================================================

    async fn process_directory(self: Arc<Self>, entry: LocalEntry, parent: RemoteId) -> UploadReport {
        let path = entry.path().to_path_buf();
        let name = match entry.name() {
            Some(name) => name,
            None => return UploadReport::failed(path, "directory has no name"),
        };

        // Container creation happens-before any child fan-out
        let folder = {
            let permit = match self.acquire_permit().await {
                Ok(permit) => permit,
                Err(err) => return UploadReport::failed(path, format!("{err:#}")),
            };
            let resolved = self
                .with_cancel(self.resolver.resolve_or_create(&name, Some(&parent)))
                .await;
            drop(permit);

            match resolved {
                Ok(folder) => folder,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = format!("{err:#}"),
                        "Folder resolution failed, subtree abandoned"
                    );
                    return UploadReport::failed(
                        path,
                        format!("folder resolution failed: {err:#}"),
                    );
                }
            }
        };

        // One-time listing; a failure here means no children are attempted
        let child_paths = match list_children(&path).await {
            Ok(paths) => paths,
            Err(err) => {
                return UploadReport::failed(path, format!("cannot list directory: {err:#}"));
            }
        };

        debug!(
            path = %path.display(),
            children = child_paths.len(),
            folder_id = %folder.id,
            "Fanning out over directory children"
        );

        let mut handles = Vec::with_capacity(child_paths.len());
        for child_path in child_paths {
            let task = Arc::clone(&self).process_entry(child_path.clone(), folder.id.clone());
            handles.push((child_path, tokio::spawn(task)));
        }

        // Join barrier over every spawned child
        let mut children = Vec::with_capacity(handles.len());
        for (child_path, handle) in handles {
            match handle.await {
                Ok(report) => children.push(report),
                Err(err) => {
                    children.push(UploadReport::failed(
                        child_path,
                        format!("child task panicked: {err}"),
                    ));
                }
            }
        }

        let failed: usize = children.iter().map(UploadReport::failure_count).sum();
        if failed > 0 {
            warn!(
                path = %path.display(),
                failed,
                total = children.len(),
                "Directory completed with child failures"
            );
        } else {
            info!(
                path = %path.display(),
                children = children.len(),
                "Directory completed"
            );
        }

        UploadReport {
            path,
            outcome: UploadOutcome::FolderCreated { folder, children },
        }
    }

    // ========================================================================
    // Pool and cancellation plumbing
    // ========================================================================

    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                anyhow::bail!("operation cancelled by shutdown")
            }
            permit = Arc::clone(&self.transfer_pool).acquire_owned() => {
                permit.context("Transfer pool closed")
            }
        }
    }

    async fn with_cancel<T>(
        &self,
        operation: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                anyhow::bail!("operation cancelled by shutdown")
            }
            result = operation => result,
        }
    }
}

/// Lists a directory's immediate children, sorted for stable report order
async fn list_children(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dir = tokio::fs::read_dir(path)
        .await
        .context("read_dir failed")?;
    let mut children = Vec::new();
    loop {
        match dir.next_entry().await {
            Ok(Some(entry)) => children.push(entry.path()),
            Ok(None) => break,
            Err(err) => return Err(err).context("directory listing failed"),
        }
    }
    children.sort();
    Ok(children)
}

// ============================================================================
// Unit tests
// ============================================================================
