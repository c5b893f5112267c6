//! Watch service event loop
//!
//! Drains watcher events one at a time through the decision stage (settle
//! check, destination prompt, destination resolution) and hands each entry
//! to the orchestrator on its own task. Prompts can never overlap because
//! the decision stage is strictly sequential; the event channel absorbs
//! bursts that arrive while a prompt is pending.
//!
//! ```text
//! DropWatcher ──mpsc──▶ WatchService ──spawn──▶ UploadOrchestrator
//!                         │                        │
//!                         ├ settle check           └──▶ report channel
//!                         ├ choose_destination
//!                         └ resolve_destination
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dropsync_core::config::Config;
use dropsync_core::ports::IDecisionPrompt;

use crate::orchestrator::{UploadOrchestrator, UploadReport};
use crate::watcher::{is_entry_settled, WatchEvent};

/// Upper bound on settle re-checks before proceeding with a still-changing
/// entry. At the default 500ms delay this is 30 seconds of grace.
const SETTLE_MAX_ROUNDS: u32 = 60;

// ============================================================================
// WatchService
// ============================================================================

/// Event loop connecting the drop-directory watcher to the upload engine
///
/// Owns the receiving half of the watcher channel and the sending half of
/// the report channel. `run` consumes the service and exits when the
/// cancellation token fires or the watcher side closes.
pub struct WatchService {
    orchestrator: Arc<UploadOrchestrator>,
    prompt: Arc<dyn IDecisionPrompt>,
    /// Destination folder names offered for every top-level entry
    destinations: Vec<String>,
    /// The drop directory; events outside it are discarded
    root: PathBuf,
    settle_delay_ms: u64,
    event_rx: mpsc::Receiver<WatchEvent>,
    report_tx: mpsc::Sender<UploadReport>,
    cancel: CancellationToken,
}

impl WatchService {
    /// Creates the service
    ///
    /// # Arguments
    /// * `orchestrator` - The upload engine entries are dispatched to
    /// * `prompt` - Destination decision prompt
    /// * `config` - Source of the watch root, settle delay, and destinations
    /// * `event_rx` - Receiving half of the watcher channel
    /// * `report_tx` - Where terminal reports are delivered
    /// * `cancel` - Cooperative shutdown signal
    pub fn new(
        orchestrator: Arc<UploadOrchestrator>,
        prompt: Arc<dyn IDecisionPrompt>,
        config: &Config,
        event_rx: mpsc::Receiver<WatchEvent>,
        report_tx: mpsc::Sender<UploadReport>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            prompt,
            destinations: config.drive.destinations.clone(),
            root: config.watch.expanded_root(),
            settle_delay_ms: config.watch.settle_delay_ms,
            event_rx,
            report_tx,
            cancel,
        }
    }

    /// Runs the event loop until cancellation or watcher shutdown
    ///
    /// In-flight uploads are drained before returning so a Ctrl-C never
    /// abandons a transfer that already started.
    pub async fn run(mut self) {
        info!(root = %self.root.display(), "Watch service started");
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                event = self.event_rx.recv() => match event {
                    Some(WatchEvent::Created(path)) => {
                        self.handle_created(path, &mut in_flight).await;
                        in_flight.retain(|handle| !handle.is_finished());
                    }
                    None => {
                        warn!("Watcher channel closed");
                        break;
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            info!(count = in_flight.len(), "Waiting for in-flight uploads");
        }
        for handle in in_flight {
            if let Err(err) = handle.await {
                warn!(error = %err, "Upload task panicked");
            }
        }
        info!("Watch service stopped");
    }

    /// Decision stage for one watcher event
    ///
    /// Everything up to and including destination resolution happens
    /// inline; only the orchestration itself is spawned.
    async fn handle_created(&self, path: PathBuf, in_flight: &mut Vec<JoinHandle<()>>) {
        // NonRecursive watching still surfaces the occasional event for the
        // root itself or a stale path; only direct children are ours.
        if path.parent() != Some(self.root.as_path()) {
            debug!(path = %path.display(), "Ignoring event outside the watch root");
            return;
        }
        debug!(path = %path.display(), "New entry detected");

        if !self.wait_until_settled(&path).await {
            self.report(UploadReport::failed(
                path,
                "cancelled while waiting for the entry to settle",
            ))
            .await;
            return;
        }

        let destination = match self.prompt.choose_destination(&self.destinations).await {
            Ok(name) => name,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = format!("{err:#}"),
                    "Destination selection failed"
                );
                self.report(UploadReport::failed(
                    path,
                    format!("destination selection failed: {err:#}"),
                ))
                .await;
                return;
            }
        };

        let folder = match self.orchestrator.resolve_destination(&destination).await {
            Ok(folder) => folder,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    destination = %destination,
                    error = format!("{err:#}"),
                    "Destination resolution failed"
                );
                self.report(UploadReport::failed(
                    path,
                    format!("cannot resolve destination '{destination}': {err:#}"),
                ))
                .await;
                return;
            }
        };

        info!(
            path = %path.display(),
            destination = %destination,
            folder_id = %folder.id,
            "Dispatching upload"
        );
        let orchestrator = Arc::clone(&self.orchestrator);
        let report_tx = self.report_tx.clone();
        in_flight.push(tokio::spawn(async move {
            let report = orchestrator.process(&path, &folder.id).await;
            if report_tx.send(report).await.is_err() {
                debug!("Report receiver dropped");
            }
        }));
    }

    /// Re-checks the settle condition until it holds or the round cap hits
    ///
    /// Returns `false` only when cancelled mid-wait.
    async fn wait_until_settled(&self, path: &Path) -> bool {
        for _ in 0..SETTLE_MAX_ROUNDS {
            if self.cancel.is_cancelled() {
                return false;
            }
            if is_entry_settled(path, self.settle_delay_ms).await {
                return true;
            }
        }
        warn!(
            path = %path.display(),
            "Entry still changing after the settle grace period, proceeding anyway"
        );
        true
    }

    async fn report(&self, report: UploadReport) {
        if self.report_tx.send(report).await.is_err() {
            debug!("Report receiver dropped");
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
