//! Upload command - One-shot upload of a file or directory
//!
//! Runs the same classification and folder-mirroring pipeline as `watch`,
//! but for a single path named on the command line instead of a watcher
//! event.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output::{self, get_formatter, OutputFormat};
use crate::prompt::ConsolePrompt;

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// File or directory to upload
    pub path: PathBuf,

    /// Destination folder name (skips the destination prompt)
    #[arg(long)]
    pub dest: Option<String>,
}

impl UploadCommand {
    /// Execute a one-shot upload:
    /// 1. Load and validate config (watch.root is not involved here)
    /// 2. Build the Drive-backed store from stored credentials
    /// 3. Resolve the destination folder, prompting if needed
    /// 4. Run the orchestrator over the path and print the report
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        use dropsync_core::config::Config;
        use dropsync_core::ports::IDecisionPrompt;
        use dropsync_sync::orchestrator::UploadOrchestrator;

        let fmt = get_formatter(format == OutputFormat::Json);

        // Step 1: Load and check configuration. A one-shot upload never
        // touches the drop directory, so watch.root errors are ignored.
        let config = Config::load_or_default(config_path);
        let errors: Vec<_> = config
            .validate()
            .into_iter()
            .filter(|e| e.field != "watch.root")
            .collect();
        if !errors.is_empty() {
            for error in &errors {
                fmt.error(&error.to_string());
            }
            bail!("invalid configuration at {}", config_path.display());
        }

        if !self.path.exists() {
            bail!("no such file or directory: {}", self.path.display());
        }

        // Step 2: Build the Drive-backed store
        fmt.info("Authenticating...");
        let store = super::build_store(&config).await?;

        // Step 3: Wire Ctrl+C to cooperative cancellation
        let cancel = CancellationToken::new();
        tokio::spawn(super::shutdown_signal(cancel.clone()));

        let prompt = Arc::new(ConsolePrompt::new());
        let mut orchestrator =
            UploadOrchestrator::new(store, prompt.clone(), &config, cancel.clone());
        if format == OutputFormat::Human {
            orchestrator = orchestrator.with_progress(Arc::new(output::progress_printer));
        }
        let orchestrator = Arc::new(orchestrator);

        let destination = match &self.dest {
            Some(name) => name.clone(),
            None => {
                prompt
                    .choose_destination(&config.drive.destinations)
                    .await?
            }
        };
        let folder = orchestrator
            .resolve_destination(&destination)
            .await
            .with_context(|| format!("cannot resolve destination '{destination}'"))?;

        info!(path = %self.path.display(), destination = %destination, "Uploading");

        // Step 4: Run the upload and print the per-entry report
        let report = Arc::clone(&orchestrator).process(&self.path, &folder.id).await;
        output::print_report(&*fmt, &report, format);

        let failed = report.failure_count();
        if failed > 0 {
            bail!("{failed} of the processed entries failed");
        }
        Ok(())
    }
}
