//! Drop-directory watching
//!
//! Provides a [`DropWatcher`] that wraps the `notify` crate to monitor the
//! drop directory for new entries, converting raw OS events into
//! [`WatchEvent`] values delivered through a bounded channel.
//!
//! ## Architecture
//!
//! ```text
//! inotify
//!    │
//!    ▼
//! DropWatcher ──→ mpsc::channel (bounded) ──→ WatchService
//! ```
//!
//! Only creation events are forwarded; modifications, removals, and renames
//! of existing entries are not mirrored. The watch is non-recursive: new
//! entries inside a freshly created directory are discovered by the
//! orchestrator's own fan-out, not by further watcher events.
//!
//! The channel is bounded and fed with `blocking_send` from the notify
//! callback thread, so event bursts apply backpressure to that thread
//! instead of dropping events.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// ============================================================================
// WatchEvent
// ============================================================================

/// A filesystem event the sync engine reacts to
///
/// Decoupled from the `notify` crate's raw event types; only entry
/// creation is represented because nothing else triggers an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A new file or directory appeared at the given path
    Created(PathBuf),
}

impl WatchEvent {
    /// Returns the path associated with this event
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(p) => p,
        }
    }
}

// ============================================================================
// DropWatcher
// ============================================================================

/// Watches the drop directory for new entries using the OS-native mechanism
///
/// On Linux this typically uses inotify. The watcher converts raw OS events
/// into [`WatchEvent`] values and sends them through an mpsc channel.
///
/// ## Usage
///
/// ```ignore
/// let (mut watcher, rx) = DropWatcher::new(1024)?;
/// watcher.watch(&config.watch.root)?;
/// // rx.recv().await to consume events
/// ```
pub struct DropWatcher {
    /// The underlying notify watcher instance
    watcher: RecommendedWatcher,
}

impl DropWatcher {
    /// Creates a new `DropWatcher` with a bounded event channel
    ///
    /// # Arguments
    /// * `event_buffer` - Channel capacity; bursts beyond it block the
    ///   notify callback thread until the consumer catches up
    ///
    /// # Returns
    /// A tuple of `(DropWatcher, mpsc::Receiver<WatchEvent>)`.
    ///
    /// # Errors
    /// Returns an error if the underlying OS watcher cannot be created
    pub fn new(event_buffer: usize) -> Result<(Self, mpsc::Receiver<WatchEvent>)> {
        let (event_tx, event_rx) = mpsc::channel::<WatchEvent>(event_buffer);

        info!(event_buffer, "Initializing drop-directory watcher");

        let watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(created) = map_notify_event(&event) {
                        if let Err(e) = event_tx.blocking_send(created) {
                            warn!(error = %e, "Failed to send watch event (receiver dropped)");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "Drop watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create drop-directory watcher")?;

        Ok((Self { watcher }, event_rx))
    }

    /// Starts watching a directory for new direct children
    ///
    /// The watch is deliberately non-recursive: a created subtree is
    /// reported once, as its top-level entry, and the orchestrator walks
    /// the rest.
    ///
    /// # Arguments
    /// * `path` - The drop directory to watch
    ///
    /// # Errors
    /// Returns an error if the path cannot be watched (e.g., does not exist,
    /// insufficient permissions, or inotify watch limit reached)
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Starting drop-directory watch");

        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch path: {}", path.display()))?;

        Ok(())
    }
}

// ============================================================================
// Event mapping - notify::Event → WatchEvent
// ============================================================================

/// Converts a `notify::Event` into our internal `WatchEvent`
///
/// Only `Create(*)` kinds map to [`WatchEvent::Created`]. Everything else
/// (modify, remove, rename, access) returns `None` and is dropped, since
/// the engine mirrors new entries only.
fn map_notify_event(event: &notify::Event) -> Option<WatchEvent> {
    match &event.kind {
        EventKind::Create(_) => {
            let path = event.paths.first()?;
            debug!(path = %path.display(), "Mapped Create event");
            Some(WatchEvent::Created(path.clone()))
        }
        _ => {
            debug!(kind = ?event.kind, "Ignoring event kind");
            None
        }
    }
}

// ============================================================================
// Entry settle check
// ============================================================================

/// Checks whether a new entry has settled (is no longer being written)
///
/// Stats the path twice, separated by `settle_delay_ms` milliseconds. The
/// entry counts as settled when size and modification time are identical
/// across both reads. Directories settle immediately; only file contents
/// can arrive half-written.
///
/// # Arguments
/// * `path` - The entry to check
/// * `settle_delay_ms` - Milliseconds between the two stat calls
///
/// # Returns
/// `true` if the entry is settled, `false` if it changed between reads or
/// could not be stat'ed at all.
pub async fn is_entry_settled(path: &Path, settle_delay_ms: u64) -> bool {
    let first = match stat_snapshot(path).await {
        Some(snapshot) => snapshot,
        None => return false,
    };

    if first.is_dir {
        return true;
    }

    tokio::time::sleep(Duration::from_millis(settle_delay_ms)).await;

    let second = match stat_snapshot(path).await {
        Some(snapshot) => snapshot,
        None => return false,
    };

    let settled = first.len == second.len && first.modified == second.modified;
    debug!(
        path = %path.display(),
        size_first = first.len,
        size_second = second.len,
        settled,
        "Entry settle check"
    );
    settled
}

struct StatSnapshot {
    is_dir: bool,
    len: u64,
    modified: Option<SystemTime>,
}

async fn stat_snapshot(path: &Path) -> Option<StatSnapshot> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Some(StatSnapshot {
            is_dir: metadata.is_dir(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Cannot stat entry for settle check"
            );
            None
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
