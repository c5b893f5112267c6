//! CLI subcommand implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use dropsync_core::config::Config;
use dropsync_core::ports::IRemoteStore;
use dropsync_drive::auth::DriveAuthAdapter;
use dropsync_drive::client::DriveClient;
use dropsync_drive::store::DriveStore;

pub mod auth;
pub mod config;
pub mod upload;
pub mod watch;

/// Builds the authenticated Drive store from stored tokens
///
/// Refreshes the access token first when it is expired or close to expiry.
///
/// # Errors
/// Returns an error when OAuth credentials are missing from the
/// configuration or no tokens are stored in the keyring.
pub(crate) async fn build_store(config: &Config) -> Result<Arc<dyn IRemoteStore>> {
    let client_id = config
        .auth
        .client_id
        .clone()
        .context("No client_id configured. Set auth.client_id in config.yaml.")?;
    let client_secret = config
        .auth
        .client_secret
        .clone()
        .context("No client_secret configured. Set auth.client_secret in config.yaml.")?;

    let adapter = DriveAuthAdapter::with_credentials(client_id, client_secret);
    let tokens = adapter.load_fresh_tokens().await?;

    let client = DriveClient::new(&tokens.access_token);
    let store =
        DriveStore::new(client).with_chunk_size(config.transfers.chunk_size_bytes() as usize);
    Ok(Arc::new(store))
}

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
///
/// Spawned alongside long-running commands so in-flight transfers get a
/// chance to drain before the process exits.
pub(crate) async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
