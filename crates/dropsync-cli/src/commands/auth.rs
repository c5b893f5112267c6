//! Auth commands - Login, Logout, and Status for Google Drive authentication
//!
//! Provides the `dropsync auth` CLI subcommands which:
//! 1. `login`  - Runs the OAuth2 PKCE flow via DriveAuthAdapter, stores
//!    tokens in the system keyring, and fetches the signed-in account info.
//! 2. `logout` - Clears tokens from the keyring.
//! 3. `status` - Shows stored-token validity without touching the network.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authenticate with Google Drive via OAuth2
    Login {
        /// Custom OAuth client ID (overrides auth.client_id)
        #[arg(long)]
        client_id: Option<String>,
        /// Custom OAuth client secret (overrides auth.client_secret)
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let fmt = get_formatter(format == OutputFormat::Json);
        match self {
            AuthCommand::Login {
                client_id,
                client_secret,
            } => {
                self.execute_login(
                    client_id.as_deref(),
                    client_secret.as_deref(),
                    config_path,
                    &*fmt,
                )
                .await
            }
            AuthCommand::Logout => self.execute_logout(&*fmt).await,
            AuthCommand::Status => self.execute_status(&*fmt, format).await,
        }
    }

    /// Execute the login flow:
    /// 1. Load config for OAuth credentials
    /// 2. Run OAuth2 PKCE via DriveAuthAdapter
    /// 3. Store tokens in keyring
    /// 4. Fetch signed-in account info from the Drive API
    async fn execute_login(
        &self,
        cli_client_id: Option<&str>,
        cli_client_secret: Option<&str>,
        config_path: &Path,
        fmt: &dyn crate::output::OutputFormatter,
    ) -> Result<()> {
        use dropsync_core::config::Config;
        use dropsync_drive::auth::{DriveAuthAdapter, KeyringTokenStorage};
        use dropsync_drive::client::DriveClient;

        // Step 1: Load config for credentials
        let config = Config::load_or_default(config_path);

        let client_id = cli_client_id
            .map(|s| s.to_string())
            .or(config.auth.client_id.clone())
            .context("No client_id provided. Use --client-id or set auth.client_id in config.yaml")?;
        let client_secret = cli_client_secret
            .map(|s| s.to_string())
            .or(config.auth.client_secret.clone())
            .context(
                "No client_secret provided. Use --client-secret or set auth.client_secret in config.yaml",
            )?;

        info!(client_id = %client_id, "Starting OAuth2 login");

        // Step 2: Run OAuth2 PKCE flow
        fmt.info("Opening browser for Google sign-in...");
        let auth_adapter = DriveAuthAdapter::with_credentials(client_id, client_secret);
        let tokens = auth_adapter.login().await.context("OAuth2 login failed")?;

        // Step 3: Store tokens in keyring
        KeyringTokenStorage::store(&tokens).context("Failed to store tokens in keyring")?;

        // Step 4: Fetch account info from the Drive API
        fmt.info("Retrieving account information...");
        let client = DriveClient::new(&tokens.access_token);
        let about = client
            .get_about()
            .await
            .context("Failed to retrieve account info from the Drive API")?;

        info!(email = %about.email, display_name = %about.display_name, "Login complete");

        fmt.success(&format!(
            "Authenticated as {} ({})",
            about.display_name, about.email
        ));
        fmt.info(&format!(
            "Access token expires {}",
            tokens.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if tokens.refresh_token.is_none() {
            fmt.warn("No refresh token was issued; you will need to log in again after expiry");
        }

        Ok(())
    }

    /// Execute logout: clear tokens from the keyring
    async fn execute_logout(&self, fmt: &dyn crate::output::OutputFormatter) -> Result<()> {
        use dropsync_drive::auth::KeyringTokenStorage;

        if matches!(KeyringTokenStorage::load(), Ok(None)) {
            fmt.info("No stored credentials. Nothing to log out.");
            return Ok(());
        }

        KeyringTokenStorage::clear().context("Failed to clear tokens from keyring")?;
        info!("Logged out");

        fmt.success("Logged out successfully");
        fmt.info("Credentials removed from keyring");

        Ok(())
    }

    /// Execute status check: report token presence and validity
    async fn execute_status(
        &self,
        fmt: &dyn crate::output::OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        use dropsync_drive::auth::KeyringTokenStorage;

        let tokens = match KeyringTokenStorage::load() {
            Ok(tokens) => tokens,
            Err(err) => {
                fmt.error(&format!("Could not read the keyring: {err:#}"));
                return Ok(());
            }
        };

        let tokens = match tokens {
            Some(tokens) => tokens,
            None => {
                if matches!(format, OutputFormat::Json) {
                    fmt.print_json(&serde_json::json!({ "authenticated": false }));
                } else {
                    fmt.info("Authentication status: Not configured");
                    fmt.info("Run 'dropsync auth login' to authenticate");
                }
                return Ok(());
            }
        };

        let token_status = if tokens.is_expired() { "Expired" } else { "Valid" };

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::json!({
                "authenticated": true,
                "token_status": token_status,
                "expires_at": tokens.expires_at.to_rfc3339(),
                "refresh_token_stored": tokens.refresh_token.is_some(),
            });
            fmt.print_json(&json);
        } else {
            fmt.success("Credentials found in keyring");
            fmt.info(&format!("Token status: {}", token_status));
            fmt.info(&format!(
                "Expires:      {}",
                tokens.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if tokens.is_expired() {
                if tokens.refresh_token.is_some() {
                    fmt.info("The token will refresh automatically on next use");
                } else {
                    fmt.info("Run 'dropsync auth login' to authenticate again");
                }
            }
        }

        Ok(())
    }
}
