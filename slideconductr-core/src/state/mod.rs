//! Presentation state and display status
//!
//! The state is the only mutable record in the engine; the status is a
//! pure function of it plus the link state.

pub mod events;
pub mod presentation;
pub mod status;

pub use events::{Button, Event};
pub use presentation::{ApplyError, FieldChange, Latches, PresentationState};
pub use status::{DisplayStatus, StatusInputs};
