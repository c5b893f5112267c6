//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote storage operations (Google Drive, future providers)
//! - [`IDecisionPrompt`] - Interactive decisions deferred to the user

pub mod decisions;
pub mod remote_store;

pub use decisions::IDecisionPrompt;
pub use remote_store::{IRemoteStore, ProgressFn, RemoteFolder};
