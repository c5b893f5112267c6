//! Dropsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `LocalEntry`, `TransferStrategy`, `RemoteId`, `ContentTypeResolver`
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `IDecisionPrompt`
//! - **Configuration** - Typed YAML config with validation
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement. The upload
//! engine in `dropsync-sync` drives domain types through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
