//! Configuration types
//!
//! Engine configuration, optionally stored as postcard binary data.

pub mod types;

pub use types::*;
