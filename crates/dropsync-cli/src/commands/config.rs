//! Config command - View and manage Dropsync configuration
//!
//! Provides the `dropsync config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Writes a commented starter configuration file
//! 3. Prints the path the configuration is read from

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Write a commented starter configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path).await,
            ConfigCommand::Init { force } => self.execute_init(*force, format, config_path).await,
            ConfigCommand::Path => self.execute_path(format, config_path).await,
        }
    }

    /// Show the effective configuration (file values merged over defaults)
    async fn execute_show(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        use dropsync_core::config::Config;

        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let config = Config::load_or_default(config_path);

        info!(config_path = %config_path.display(), "Showing configuration");

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;

            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    /// Write the starter configuration template
    async fn execute_init(
        &self,
        force: bool,
        format: OutputFormat,
        config_path: &Path,
    ) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));

        if config_path.exists() && !force {
            formatter.error(&format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ));
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        std::fs::write(config_path, default_config_template())
            .context("Failed to write configuration file")?;

        info!(config_path = %config_path.display(), "Wrote starter configuration");

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::json!({
                "created": true,
                "config_path": config_path.display().to_string(),
            });
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Wrote {}", config_path.display()));
            formatter
                .info("Edit the destinations and auth sections, then run 'dropsync auth login'");
        }

        Ok(())
    }

    /// Print the configuration file path
    async fn execute_path(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        if matches!(format, OutputFormat::Json) {
            let formatter = get_formatter(true);
            let json = serde_json::json!({
                "config_path": config_path.display().to_string(),
                "exists": config_path.exists(),
            });
            formatter.print_json(&json);
        } else {
            // Bare path on stdout so shell scripts can consume it.
            println!("{}", config_path.display());
        }

        Ok(())
    }
}

/// Commented starter configuration written by `dropsync config init`.
///
/// Values match the built-in defaults. The auth section stays fully
/// commented out: an uncommented bare `auth:` key parses as null and
/// rejects the whole file.
fn default_config_template() -> &'static str {
    r#"# Dropsync configuration.
#
# Missing sections fall back to built-in defaults, so everything here is
# optional. Uncomment and fill in the auth section before running
# 'dropsync auth login', or pass --client-id/--client-secret on the
# command line instead.

watch:
  # Local drop directory mirrored into Drive. A leading ~ expands to $HOME.
  root: ~/Dropsync
  # Milliseconds an entry's size must hold steady before it uploads.
  settle_delay_ms: 500
  # Capacity of the filesystem event channel.
  event_buffer: 1024

drive:
  # Destination folder names offered when a new entry appears. A single
  # entry is picked without prompting.
  destinations:
    - Dropsync Inbox

transfers:
  # Files at or below this size (MiB) use a single-request upload.
  simple_limit_mb: 5
  # Resumable upload chunk size (MiB).
  chunk_size_mb: 8
  # Maximum concurrent transfers.
  max_concurrent: 8
  # Cross-restart resume of interrupted sessions. Not supported yet.
  persist_resume_state: false

cleanup:
  # Ask before deleting a local file whose upload completed.
  prompt_delete: true

# auth:
#   client_id: your-client-id.apps.googleusercontent.com
#   client_secret: your-client-secret

content_types:
  # Extension-to-MIME overrides merged over the built-in table. Keys are
  # extensions without the leading dot.
  overrides: {}
"#
}
