//! Events delivered by the host

use slideconductr_protocol::Intent;

/// Physical buttons the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Advance to the next slide
    Up,
    /// Go back to the previous slide
    Down,
}

impl Button {
    /// Intent this button sends
    pub fn intent(self) -> Intent {
        match self {
            Button::Up => Intent::Next,
            Button::Down => Intent::Prev,
        }
    }
}

/// Events that drive the engine, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'a> {
    /// One-second tick carrying the current wall-clock time (epoch seconds)
    Tick { now: i64 },
    /// An encoded batch of field updates from the controller
    FieldUpdate(&'a [u8]),
    /// The link to the phone came up or went down
    ConnectionChanged(bool),
    /// A button was pressed
    ButtonPressed(Button),
}

impl Event<'_> {
    /// Check if this event is user-initiated
    pub fn is_user_event(&self) -> bool {
        matches!(self, Event::ButtonPressed(_))
    }

    /// Check if this event comes from the phone link
    pub fn is_link_event(&self) -> bool {
        matches!(self, Event::FieldUpdate(_) | Event::ConnectionChanged(_))
    }
}
