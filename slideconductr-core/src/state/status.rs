//! Display status resolution
//!
//! The status is derived, never stored: a pure function of the link state
//! and the two readiness latches, evaluated in strict priority order.

/// What the display is currently able to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayStatus {
    /// No link to the phone
    Disconnected,
    /// Linked, but the controller has not been configured
    Unconfigured,
    /// Configured, waiting for a presentation to be opened
    Connecting,
    /// Presentation loaded; slide and timers are shown
    Ready,
}

/// Inputs to status resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusInputs {
    pub connected: bool,
    pub configured: bool,
    pub loaded: bool,
}

impl StatusInputs {
    /// Resolve these inputs to a status
    pub fn resolve(self) -> DisplayStatus {
        DisplayStatus::resolve(self.connected, self.configured, self.loaded)
    }
}

impl DisplayStatus {
    /// Resolve a status; the first failing condition wins
    ///
    /// No debouncing: a dropped link flips straight to `Disconnected`.
    pub fn resolve(connected: bool, configured: bool, loaded: bool) -> Self {
        if !connected {
            DisplayStatus::Disconnected
        } else if !configured {
            DisplayStatus::Unconfigured
        } else if !loaded {
            DisplayStatus::Connecting
        } else {
            DisplayStatus::Ready
        }
    }

    /// Check if the presentation view is live
    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayStatus::Ready)
    }

    /// Check if the status message should cover the presentation view
    pub fn shows_overlay(&self) -> bool {
        !self.is_ready()
    }
}
