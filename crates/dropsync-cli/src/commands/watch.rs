//! Watch command - Mirror the drop directory into Drive
//!
//! Wires the filesystem watcher, the decision/upload service, and a
//! report printer together, then runs until Ctrl+C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output::{self, get_formatter, OutputFormat};
use crate::prompt::ConsolePrompt;

/// Reports buffered between the service and the printer.
const REPORT_BUFFER: usize = 64;

#[derive(Debug, Args)]
pub struct WatchCommand {}

impl WatchCommand {
    /// Execute the watch session:
    /// 1. Load and validate config; check the drop directory exists
    /// 2. Build the Drive-backed store from stored credentials
    /// 3. Start the watcher and the decision/upload service
    /// 4. Print reports until shutdown
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        use dropsync_core::config::Config;
        use dropsync_sync::orchestrator::UploadOrchestrator;
        use dropsync_sync::service::WatchService;
        use dropsync_sync::watcher::DropWatcher;

        let fmt = get_formatter(format == OutputFormat::Json);

        // Step 1: Load and validate configuration
        let config = Config::load_or_default(config_path);
        let errors = config.validate();
        if !errors.is_empty() {
            for error in &errors {
                fmt.error(&error.to_string());
            }
            bail!("invalid configuration at {}", config_path.display());
        }

        let root = config.watch.expanded_root();
        if !root.is_dir() {
            bail!("watch root is not a directory: {}", root.display());
        }

        // Step 2: Build the Drive-backed store
        fmt.info("Authenticating...");
        let store = super::build_store(&config).await?;

        // Step 3: Wire Ctrl+C to cooperative shutdown
        let cancel = CancellationToken::new();
        tokio::spawn(super::shutdown_signal(cancel.clone()));

        // Step 4: Assemble watcher, orchestrator, and service
        let prompt = Arc::new(ConsolePrompt::new());
        let mut orchestrator =
            UploadOrchestrator::new(store, prompt.clone(), &config, cancel.clone());
        if format == OutputFormat::Human {
            orchestrator = orchestrator.with_progress(Arc::new(output::progress_printer));
        }
        let orchestrator = Arc::new(orchestrator);

        let (mut watcher, event_rx) = DropWatcher::new(config.watch.event_buffer)?;
        watcher
            .watch(&root)
            .with_context(|| format!("cannot watch {}", root.display()))?;

        let (report_tx, mut report_rx) = mpsc::channel(REPORT_BUFFER);
        let service = WatchService::new(
            Arc::clone(&orchestrator),
            prompt,
            &config,
            event_rx,
            report_tx,
            cancel.clone(),
        );
        let service_handle = tokio::spawn(service.run());

        fmt.success(&format!("Watching {}", root.display()));
        fmt.info(&format!(
            "Destinations: {}",
            config.drive.destinations.join(", ")
        ));
        fmt.info("Press Ctrl-C to stop");

        info!(root = %root.display(), "Watch session started");

        // Step 5: Print reports until the service drops its sender
        while let Some(report) = report_rx.recv().await {
            output::print_report(&*fmt, &report, format);
        }

        service_handle.await.context("watch service task failed")?;
        fmt.info("Stopped");

        // The watcher must outlive the session or events stop flowing.
        drop(watcher);
        Ok(())
    }
}
