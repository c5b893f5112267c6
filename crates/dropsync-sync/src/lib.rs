//! Dropsync Sync - Upload orchestration engine
//!
//! Provides:
//! - Drop-directory watching (notify events bridged into tokio)
//! - Remote folder resolution with find-or-create semantics
//! - Concurrent, bounded upload fan-out for files and directory trees
//! - The watch-service event loop that serializes human prompts
//!
//! ## Modules
//!
//! - [`watcher`] - Filesystem watcher boundary and settle checks
//! - [`resolver`] - Keyed find-or-create for remote folders
//! - [`orchestrator`] - Per-entry upload state machine and reports
//! - [`service`] - Event loop wiring watcher, prompts, and orchestrator

pub mod orchestrator;
pub mod resolver;
pub mod service;
pub mod watcher;
