//! Link presence

/// Trait for polling whether the phone link is up
///
/// Changes are also pushed as `Event::ConnectionChanged`; polling is used
/// to seed the engine at startup.
pub trait ConnectionSource {
    /// Check if the phone is currently connected
    fn is_connected(&self) -> bool;
}

impl ConnectionSource for bool {
    fn is_connected(&self) -> bool {
        *self
    }
}
