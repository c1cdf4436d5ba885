//! Host abstraction traits
//!
//! These traits define the interface between the engine and the watch's
//! transport and link services.

pub mod connection;
pub mod outbox;

pub use connection::ConnectionSource;
pub use outbox::{Outbox, OutboxError};
