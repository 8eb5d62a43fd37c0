//! # client_sync
//!
//! The synchronization controller: consumes decoded envelopes from the
//! transport session, dispatches them onto the entity registry, and encodes
//! outgoing player intents.

pub mod controller;

pub use controller::{SyncConfig, SyncController};
