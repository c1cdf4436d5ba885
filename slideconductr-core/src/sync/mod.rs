//! Sync channel adapter
//!
//! Receives encoded field batches from the phone link and applies them to
//! the presentation state, keeping the derived progress text current.

pub mod channel;

pub use channel::{BatchReport, SyncChannel, SyncError};
