//! User decision port (driven/secondary port)
//!
//! This module defines the interface for the two interactive decisions the
//! engine defers to the user: which remote destination a top-level entry
//! belongs to, and whether a fully uploaded file may be removed locally.
//! The reference implementation reads from the terminal; tests substitute
//! scripted fakes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because prompt delivery is adapter-specific.
//! - Both calls block the asking task until the user answers; concurrent
//!   askers must be serialized by the implementation so prompts never
//!   interleave on screen.
//! - A closed input stream is an error, not a default answer.

use std::path::Path;

// ============================================================================
// IDecisionPrompt trait
// ============================================================================

/// Port trait for interactive user decisions
///
/// ## Implementation Notes
///
/// - `choose_destination` presents the configured destination names and
///   returns the chosen one verbatim. Called once per top-level entry.
/// - `confirm_local_delete` asks a yes/no question about one specific
///   file. `false` means keep the local copy; it is not an error.
/// - Implementations must hold an internal lock across each full
///   prompt/answer exchange.
#[async_trait::async_trait]
pub trait IDecisionPrompt: Send + Sync {
    /// Asks the user to pick one of the configured destination names
    ///
    /// # Arguments
    /// * `candidates` - Destination names in configuration order
    ///
    /// # Returns
    /// The selected name, exactly as it appears in `candidates`
    ///
    /// # Errors
    /// Returns an error when `candidates` is empty or input is closed
    async fn choose_destination(&self, candidates: &[String]) -> anyhow::Result<String>;

    /// Asks whether the local copy of an uploaded file should be deleted
    ///
    /// # Arguments
    /// * `path` - The local file in question
    ///
    /// # Returns
    /// `true` to delete, `false` to keep
    async fn confirm_local_delete(&self, path: &Path) -> anyhow::Result<bool>;
}
