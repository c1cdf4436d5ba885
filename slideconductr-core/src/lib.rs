//! Host-agnostic core logic for the SlideConductr watch display
//!
//! This crate contains everything that does not depend on the watch's
//! window system, radio transport or buttons:
//!
//! - Synchronized presentation state and its apply-update rules
//! - Elapsed-time clock and `MM:SS` formatting
//! - Status resolution (disconnected / unconfigured / connecting / ready)
//! - Progress text derivation
//! - Sync channel adapter and command dispatcher
//! - Single-threaded event dispatcher tying them together
//! - Configuration type definitions
//!
//! The host feeds [`Event`]s to an [`Engine`] one at a time and reads the
//! resulting [`View`] back.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod progress;
pub mod state;
pub mod sync;
pub mod text;
pub mod traits;

pub use engine::{Engine, Refresh, View};
pub use state::{Button, DisplayStatus, Event, PresentationState};
